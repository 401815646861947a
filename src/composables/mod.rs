// src/composables/mod.rs
// Per-operation request state: {data, loading, error} cells that a UI layer
// can observe while the request is in flight.
//
// Each composable owns its own state and request lifecycle. Invoking one
// again while a call is pending is allowed; the last response to resolve
// wins.

pub mod auth;
pub mod users;

pub use auth::GetCurrentUser;
pub use users::{CreateUser, DeleteUser, GetSimpleUsers, GetUsers, ResetUserPassword};

use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::http::{Envelope, Validation};

/// State cell shared between a composable and its observers
pub type Shared<T> = Arc<RwLock<T>>;

/// State of a fetch: `loading` goes `None -> Some(true) -> Some(false)`
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub loading: Option<bool>,
    /// Server errors joined with ", "; empty after a clean response
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: None,
            error: None,
        }
    }
}

impl<T> ResourceState<T> {
    pub fn is_loading(&self) -> bool {
        self.loading == Some(true)
    }

    /// The error, unless it is absent or empty
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// State of a mutation; also carries per-field validation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionState {
    pub loading: Option<bool>,
    pub error: Option<String>,
    pub validation: Validation,
}

impl ActionState {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

pub(crate) fn shared<T: Default>() -> Shared<T> {
    Arc::new(RwLock::new(T::default()))
}

/// Error reported for a failed fetch whose response carried no message
pub const UNKNOWN_FAILURE: &str = "request failed";

/// Run a fetch against a resource cell. `data` is only replaced when the
/// response succeeded; `error` and `loading` are always updated. A failure
/// never leaves `error` empty.
pub(crate) async fn fetch_into<T, F>(state: &Shared<ResourceState<T>>, request: F)
where
    F: Future<Output = Envelope<T>>,
{
    state.write().await.loading = Some(true);
    let response = request.await;

    let mut state = state.write().await;
    let error = match response.error_string() {
        e if e.is_empty() && !response.result => UNKNOWN_FAILURE.to_string(),
        e => e,
    };
    if response.result {
        if let Some(data) = response.data {
            state.data = Some(data);
        }
    }
    state.error = Some(error);
    state.loading = Some(false);
}

/// Run a mutation against an action cell, copying errors and validation out
/// of the response before handing it back.
pub(crate) async fn act_into<T, F>(state: &Shared<ActionState>, with_validation: bool, request: F) -> Envelope<T>
where
    F: Future<Output = Envelope<T>>,
{
    state.write().await.loading = Some(true);
    let response = request.await;

    let mut state = state.write().await;
    state.error = Some(response.error_string());
    if with_validation {
        state.validation = response.validation.clone();
    }
    state.loading = Some(false);
    response
}
