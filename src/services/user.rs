// src/services/user.rs
// RBAC user endpoints

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::http::{Envelope, Transport};
use crate::models::{CreatedId, NewUser, ResetPassword, SimpleUser, User};

const USERS_PATH: &str = "ui/v1/rbac/users";
const SIMPLE_USERS_PATH: &str = "ui/v1/rbac/simpleusers";

/// User administration calls. Every method returns the backend envelope;
/// failures are reported inside it, never as an `Err`.
#[derive(Clone)]
pub struct UserService {
    http: Arc<dyn Transport>,
}

impl UserService {
    pub fn new(http: Arc<dyn Transport>) -> Self {
        Self { http }
    }

    pub async fn get_users(&self) -> Envelope<Vec<User>> {
        self.http.get(USERS_PATH).await.decode()
    }

    pub async fn get_simple_users(&self) -> Envelope<Vec<SimpleUser>> {
        self.http.get(SIMPLE_USERS_PATH).await.decode()
    }

    pub async fn get_user(&self, id: i64) -> Envelope<User> {
        self.http.get(&user_path(id)).await.decode()
    }

    pub async fn create_user(&self, user: &NewUser) -> Envelope<CreatedId> {
        debug!(username = %user.username, "Creating user");
        let body = to_body(user);
        self.http.post(USERS_PATH, body).await.decode()
    }

    pub async fn delete_user(&self, id: i64) -> Envelope {
        debug!(id, "Deleting user");
        self.http.delete(&user_path(id)).await
    }

    pub async fn reset_password(&self, id: i64, data: &ResetPassword) -> Envelope {
        debug!(id, "Resetting user password");
        self.http.patch(&user_path(id), to_body(data)).await
    }
}

fn user_path(id: i64) -> String {
    format!("{}/{}", USERS_PATH, id)
}

fn to_body<T: serde::Serialize>(payload: &T) -> Option<Value> {
    serde_json::to_value(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_path() {
        assert_eq!(user_path(42), "ui/v1/rbac/users/42");
    }

    #[test]
    fn test_reset_password_body() {
        let body = to_body(&ResetPassword::new("pw")).unwrap();
        assert_eq!(body["password"], "pw");
        assert_eq!(body["password_confirm"], "pw");
    }
}
