// src/stores/mod.rs
// Client-side state holders

pub mod auth;
pub mod source_controls;

pub use auth::AuthStore;
pub use source_controls::{
    reconcile, DataRequestParams, GraphRequestParams, QueryState, RouteQuery, SourceControls,
};
