// src/services/mod.rs
// Typed wrappers over the backend REST endpoints

pub mod auth;
pub mod user;

pub use auth::AuthService;
pub use user::UserService;
