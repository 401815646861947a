// src/composables/users.rs
// User list and user administration composables

use std::collections::BTreeMap;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{act_into, fetch_into, shared, ActionState, ResourceState, Shared};
use crate::http::{Envelope, Validation};
use crate::models::{CreatedId, NewUser, ResetPassword, SimpleUser, User};
use crate::services::UserService;

const PASSWORDS_DIFFER: &str = "Passwords do not match";

/// Full user list. The first fetch starts as soon as the value is built.
///
/// Must be constructed inside a tokio runtime. Dropping the value aborts the
/// initial fetch if it is still pending.
pub struct GetUsers {
    service: UserService,
    state: Shared<ResourceState<Vec<User>>>,
    eager: Option<JoinHandle<()>>,
}

impl GetUsers {
    pub fn new(service: UserService) -> Self {
        let state = shared();
        let eager = {
            let service = service.clone();
            let state = state.clone();
            tokio::spawn(async move { fetch_into(&state, service.get_users()).await })
        };
        Self {
            service,
            state,
            eager: Some(eager),
        }
    }

    /// Fetch again
    pub async fn load(&self) {
        fetch_into(&self.state, self.service.get_users()).await
    }

    /// Wait for the fetch started at construction
    pub async fn ready(&mut self) {
        if let Some(handle) = self.eager.take() {
            if let Err(e) = handle.await {
                debug!(error = %e, "Initial user fetch did not complete");
            }
        }
    }

    pub fn state(&self) -> Shared<ResourceState<Vec<User>>> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> ResourceState<Vec<User>> {
        self.state.read().await.clone()
    }
}

impl Drop for GetUsers {
    fn drop(&mut self) {
        if let Some(handle) = self.eager.take() {
            handle.abort();
        }
    }
}

/// Username/name list for pickers. Same lifecycle as [`GetUsers`].
pub struct GetSimpleUsers {
    service: UserService,
    state: Shared<ResourceState<Vec<SimpleUser>>>,
    eager: Option<JoinHandle<()>>,
}

impl GetSimpleUsers {
    pub fn new(service: UserService) -> Self {
        let state = shared();
        let eager = {
            let service = service.clone();
            let state = state.clone();
            tokio::spawn(async move { fetch_into(&state, service.get_simple_users()).await })
        };
        Self {
            service,
            state,
            eager: Some(eager),
        }
    }

    pub async fn load(&self) {
        fetch_into(&self.state, self.service.get_simple_users()).await
    }

    pub async fn ready(&mut self) {
        if let Some(handle) = self.eager.take() {
            if let Err(e) = handle.await {
                debug!(error = %e, "Initial simple user fetch did not complete");
            }
        }
    }

    pub fn state(&self) -> Shared<ResourceState<Vec<SimpleUser>>> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> ResourceState<Vec<SimpleUser>> {
        self.state.read().await.clone()
    }
}

impl Drop for GetSimpleUsers {
    fn drop(&mut self) {
        if let Some(handle) = self.eager.take() {
            handle.abort();
        }
    }
}

pub struct CreateUser {
    service: UserService,
    state: Shared<ActionState>,
}

impl CreateUser {
    pub fn new(service: UserService) -> Self {
        Self {
            service,
            state: shared(),
        }
    }

    pub async fn create(&self, user: &NewUser) -> Envelope<CreatedId> {
        act_into(&self.state, true, self.service.create_user(user)).await
    }

    pub fn state(&self) -> Shared<ActionState> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> ActionState {
        self.state.read().await.clone()
    }
}

pub struct DeleteUser {
    service: UserService,
    state: Shared<ActionState>,
}

impl DeleteUser {
    pub fn new(service: UserService) -> Self {
        Self {
            service,
            state: shared(),
        }
    }

    pub async fn remove(&self, id: i64) -> Envelope {
        act_into(&self.state, false, self.service.delete_user(id)).await
    }

    pub fn state(&self) -> Shared<ActionState> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> ActionState {
        self.state.read().await.clone()
    }
}

pub struct ResetUserPassword {
    service: UserService,
    state: Shared<ActionState>,
}

impl ResetUserPassword {
    pub fn new(service: UserService) -> Self {
        Self {
            service,
            state: shared(),
        }
    }

    /// Mismatched passwords are rejected locally as a `password_confirm`
    /// validation failure without calling the backend.
    pub async fn reset(&self, id: i64, data: &ResetPassword) -> Envelope {
        if !data.passwords_match() {
            let response = mismatch_envelope();
            let mut state = self.state.write().await;
            state.error = Some(String::new());
            state.validation = response.validation.clone();
            state.loading = Some(false);
            return response;
        }
        act_into(&self.state, true, self.service.reset_password(id, data)).await
    }

    pub fn state(&self) -> Shared<ActionState> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> ActionState {
        self.state.read().await.clone()
    }
}

fn mismatch_envelope() -> Envelope {
    Envelope {
        result: false,
        validation: Validation {
            result: false,
            columns: BTreeMap::from([("password_confirm".to_string(), PASSWORDS_DIFFER.to_string())]),
        },
        ..Default::default()
    }
}
