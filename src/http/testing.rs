// src/http/testing.rs
// In-memory transport for unit tests

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{Envelope, Transport};

/// A recorded request
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Replies with queued envelopes per `(method, path)`. The last queued reply
/// for a route keeps being returned; unknown routes get a 404 envelope.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Envelope>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, method: Method, path: &str, envelope: Envelope) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(envelope);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Envelope {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: path.to_string(),
            body,
        });

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => Envelope::failed("HTTP 404 Not Found"),
        }
    }
}
