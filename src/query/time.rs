// src/query/time.rs
// Time range bounds: absolute epoch millis or relative expressions like "now-5m"

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FROM: &str = "now-5m";
pub const DEFAULT_TO: &str = "now";

/// One end of a time range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeBound {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// Relative expression understood by the backend (`now`, `now-1h`, ...)
    Relative(String),
}

impl TimeBound {
    /// Re-run [`try_to_millis`] on relative values that are really numbers
    pub fn normalize(self) -> Self {
        match self {
            TimeBound::Relative(s) => try_to_millis(&s),
            millis => millis,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, TimeBound::Relative(_))
    }

    pub fn as_millis(&self) -> Option<i64> {
        match self {
            TimeBound::Millis(ms) => Some(*ms),
            TimeBound::Relative(_) => None,
        }
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBound::Millis(ms) => write!(f, "{}", ms),
            TimeBound::Relative(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TimeBound {
    fn from(ms: i64) -> Self {
        TimeBound::Millis(ms)
    }
}

impl From<&str> for TimeBound {
    fn from(s: &str) -> Self {
        try_to_millis(s)
    }
}

impl From<String> for TimeBound {
    fn from(s: String) -> Self {
        try_to_millis(&s)
    }
}

/// Parse `value` as integer epoch millis, or keep it as a relative expression.
pub fn try_to_millis(value: &str) -> TimeBound {
    match value.trim().parse::<i64>() {
        Ok(ms) => TimeBound::Millis(ms),
        Err(_) => TimeBound::Relative(value.to_string()),
    }
}
