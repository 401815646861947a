// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use tracing::{debug, warn};

/// Configuration overrides read from environment variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    /// Backend base URL (TELESCOPE_URL)
    pub base_url: Option<String>,
    /// Request timeout in seconds (TELESCOPE_TIMEOUT_SECS)
    pub timeout_secs: Option<u64>,
    /// Connect timeout in seconds (TELESCOPE_CONNECT_TIMEOUT_SECS)
    pub connect_timeout_secs: Option<u64>,
    /// Local time zone (TELESCOPE_TIME_ZONE, falling back to TZ)
    pub time_zone: Option<String>,
}

impl EnvConfig {
    /// Load overrides from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through an arbitrary lookup function.
    ///
    /// Empty values are treated as unset; unparsable numbers are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Self {
            base_url: read("TELESCOPE_URL"),
            timeout_secs: read("TELESCOPE_TIMEOUT_SECS").and_then(|v| parse_secs("TELESCOPE_TIMEOUT_SECS", &v)),
            connect_timeout_secs: read("TELESCOPE_CONNECT_TIMEOUT_SECS")
                .and_then(|v| parse_secs("TELESCOPE_CONNECT_TIMEOUT_SECS", &v)),
            time_zone: read("TELESCOPE_TIME_ZONE").or_else(|| read("TZ")),
        };
        debug!(?config, "Loaded environment overrides");
        config
    }
}

fn parse_secs(key: &str, value: &str) -> Option<u64> {
    match value.parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(key, value, "Ignoring non-numeric timeout");
            None
        }
    }
}

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}
