// src/query/mod.rs
// Query-language helpers shared by the stores: time bounds, URL params,
// column lists, FlyQL expression building

pub mod columns;
pub mod flyql;
pub mod params;
pub mod time;

pub use columns::{ColumnSpec, Modifier, column_names, parse_columns};
pub use flyql::QueryValue;
pub use params::{CONTEXT_PREFIX, RouteParams, bool_from_str, parse_count};
pub use time::{TimeBound, try_to_millis};
