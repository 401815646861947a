// src/composables/auth.rs
// Current-user lookup

use super::{fetch_into, shared, ResourceState, Shared};
use crate::models::CurrentUser;
use crate::services::AuthService;

/// Loads the user owning the current session. Unlike the list composables
/// nothing is fetched until [`GetCurrentUser::load`] is called.
pub struct GetCurrentUser {
    service: AuthService,
    state: Shared<ResourceState<CurrentUser>>,
}

impl GetCurrentUser {
    pub fn new(service: AuthService) -> Self {
        Self {
            service,
            state: shared(),
        }
    }

    pub async fn load(&self) {
        fetch_into(&self.state, self.service.whoami()).await
    }

    pub fn state(&self) -> Shared<ResourceState<CurrentUser>> {
        self.state.clone()
    }

    pub async fn snapshot(&self) -> ResourceState<CurrentUser> {
        self.state.read().await.clone()
    }
}
