// src/http/mod.rs
// Transport abstraction over the backend REST API

pub mod client;
pub mod envelope;
#[cfg(test)]
pub(crate) mod testing;

pub use client::HttpClient;
pub use envelope::{Envelope, Validation};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// Performs requests against the backend and normalizes every outcome,
/// including connection failures, into an [`Envelope`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Envelope;

    async fn get(&self, path: &str) -> Envelope {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Envelope {
        self.request(Method::POST, path, body).await
    }

    async fn patch(&self, path: &str, body: Option<Value>) -> Envelope {
        self.request(Method::PATCH, path, body).await
    }

    async fn delete(&self, path: &str) -> Envelope {
        self.request(Method::DELETE, path, None).await
    }
}
