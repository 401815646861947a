// src/lib.rs
// Telescope client - typed access to the Telescope log explorer backend

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod composables;
pub mod config;
pub mod error;
pub mod highlight;
pub mod http;
pub mod models;
pub mod notify;
pub mod query;
pub mod router;
pub mod services;
pub mod stores;
pub mod timezones;

pub use error::{ClientError, Result};
