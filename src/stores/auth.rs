// src/stores/auth.rs
// Session state derived from the login check

use tracing::{debug, info};

use crate::composables::GetCurrentUser;
use crate::models::CurrentUser;
use crate::services::AuthService;

/// Who is logged in, if anyone.
///
/// `is_logged_in` is `None` until the first login check has run.
pub struct AuthStore {
    service: AuthService,
    pub user: Option<CurrentUser>,
    pub is_logged_in: Option<bool>,
    pub error: Option<String>,
}

impl AuthStore {
    pub fn new(service: AuthService) -> Self {
        Self {
            service,
            user: None,
            is_logged_in: None,
            error: None,
        }
    }

    /// Whether the login check has run at least once
    pub fn is_checked(&self) -> bool {
        self.is_logged_in.is_some()
    }

    pub fn logged_in(&self) -> bool {
        self.is_logged_in == Some(true)
    }

    /// Run the login check. Returns the error when the session is not valid.
    pub async fn login(&mut self) -> Option<String> {
        let current = GetCurrentUser::new(self.service.clone());
        current.load().await;
        let state = current.snapshot().await;

        match state.error_message().map(str::to_string) {
            None => {
                debug!(user = ?state.data.as_ref().map(|u| &u.username), "Session is valid");
                self.user = state.data;
                self.is_logged_in = Some(true);
                None
            }
            Some(error) => {
                debug!(error = %error, "Login check failed");
                self.user = None;
                self.is_logged_in = Some(false);
                self.error = Some(error.clone());
                Some(error)
            }
        }
    }

    /// Post credentials. Returns the first server error without touching the
    /// session, or refreshes it via [`AuthStore::login`] on success.
    pub async fn submit_login(&mut self, username: &str, password: &str) -> Option<String> {
        let response = self.service.login(username, password).await;
        if let Some(error) = response.first_error() {
            return Some(error.to_string());
        }

        info!(username, "Logged in");
        self.login().await;
        None
    }

    /// End the session. Local state is cleared whatever the backend says.
    pub async fn logout(&mut self) {
        let response = self.service.logout().await;
        if response.has_errors() {
            debug!(error = %response.error_string(), "Logout request failed");
        }
        self.user = None;
        self.is_logged_in = Some(false);
    }
}
