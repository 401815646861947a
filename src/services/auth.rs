// src/services/auth.rs
// Session endpoints: login, logout and the current-user check

use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::http::{Envelope, Transport};
use crate::models::CurrentUser;

const LOGIN_PATH: &str = "/ui/v1/auth/login";
const LOGOUT_PATH: &str = "/logout";
const WHOAMI_PATH: &str = "/ui/v1/auth/whoami";

#[derive(Clone)]
pub struct AuthService {
    http: Arc<dyn Transport>,
}

impl AuthService {
    pub fn new(http: Arc<dyn Transport>) -> Self {
        Self { http }
    }

    /// Post credentials. On success the session cookie lands in the transport's jar.
    pub async fn login(&self, username: &str, password: &str) -> Envelope {
        debug!(username, "Submitting login");
        let body = json!({ "username": username, "password": password });
        self.http.post(LOGIN_PATH, Some(body)).await
    }

    pub async fn logout(&self) -> Envelope {
        self.http.post(LOGOUT_PATH, None).await
    }

    /// Who the session belongs to; fails when not logged in
    pub async fn whoami(&self) -> Envelope<CurrentUser> {
        self.http.get(WHOAMI_PATH).await.decode()
    }
}
