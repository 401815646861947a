// src/models/rbac.rs
// Users as exposed by the RBAC and auth endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group membership shown on a user row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub name: String,
}

/// Full user record (`GET ui/v1/rbac/users`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub groups: Vec<UserGroup>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    /// "First Last", or the username when no name is set
    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.last_name).unwrap_or_else(|| self.username.clone())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Minimal user record for pickers (`GET ui/v1/rbac/simpleusers`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleUser {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl SimpleUser {
    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.last_name).unwrap_or_else(|| self.username.clone())
    }
}

/// How the current user authenticated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Local,
    Github,
    Okta,
    #[serde(other)]
    Other,
}

/// The logged-in user (`GET ui/v1/auth/whoami`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub avatar_url: String,
}

impl CurrentUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.last_name).unwrap_or_else(|| self.username.clone())
    }
}

/// Payload for `POST ui/v1/rbac/users`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Payload for `PATCH ui/v1/rbac/users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPassword {
    pub password: String,
    pub password_confirm: String,
}

impl ResetPassword {
    pub fn new(password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            password_confirm: password.clone(),
            password,
        }
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.password_confirm
    }
}

/// Body of a user creation response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: i64,
}

fn full_name(first: &str, last: &str) -> Option<String> {
    let name = format!("{} {}", first.trim(), last.trim());
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
