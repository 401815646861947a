// src/models/mod.rs
// Typed records exchanged with the backend

pub mod rbac;
pub mod source;

pub use rbac::{AccountType, CreatedId, CurrentUser, NewUser, ResetPassword, SimpleUser, User, UserGroup};
pub use source::{SavedView, Source, ViewData};
