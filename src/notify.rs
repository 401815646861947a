// src/notify.rs
// User-facing notifications (toasts) raised by stores

use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Default display lifetime for a toast, in milliseconds
pub const DEFAULT_LIFE_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warn,
    Error,
}

/// A toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub life_ms: u64,
}

impl Notification {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            summary: "Success".to_string(),
            detail: detail.into(),
            life_ms: DEFAULT_LIFE_MS,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: "Error".to_string(),
            detail: detail.into(),
            life_ms: DEFAULT_LIFE_MS,
        }
    }
}

/// Sink for notifications. Implemented by whatever surface shows toasts.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Success | Severity::Info => {
                info!(summary = %n.summary, life_ms = n.life_ms, "{}", n.detail)
            }
            Severity::Warn | Severity::Error => {
                warn!(summary = %n.summary, life_ms = n.life_ms, "{}", n.detail)
            }
        }
    }
}

/// Keeps every notification it receives; handy for headless callers
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}
