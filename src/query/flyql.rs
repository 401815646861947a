// src/query/flyql.rs
// Building FlyQL filter expressions from UI actions

use std::fmt;

/// Boolean AND connective of the FlyQL language
pub const AND: &str = "and";

/// Comparison operators offered when filtering by a cell value
pub const OPERATORS: &[&str] = &["=", "!=", "~", "!~", ">", ">=", "<", "<="];

/// Right-hand side of a FlyQL comparison
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) if is_bare_word(s) => f.write_str(s),
            QueryValue::Str(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            QueryValue::Int(i) => write!(f, "{}", i),
            QueryValue::Float(x) => write!(f, "{}", x),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Str(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Str(s)
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        QueryValue::Int(i)
    }
}

impl From<f64> for QueryValue {
    fn from(x: f64) -> Self {
        QueryValue::Float(x)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Bool(b)
    }
}

impl QueryValue {
    /// Map a JSON cell value onto a query value. Objects and arrays are
    /// compared as their serialized text; `null` has no representation.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(QueryValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(QueryValue::Int)
                .or_else(|| n.as_f64().map(QueryValue::Float)),
            Value::String(s) => Some(QueryValue::Str(s.clone())),
            other => Some(QueryValue::Str(other.to_string())),
        }
    }
}

/// Whether a string can be written without quotes and still read back as
/// the same string literal.
fn is_bare_word(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '@' | '/'))
        && s.parse::<f64>().is_err()
        && !matches!(s, "true" | "false" | "null" | "and" | "or" | "not")
}

/// A single `column<op>value` comparison
pub fn expression(column: &str, operator: &str, value: &QueryValue) -> String {
    format!("{}{}{}", column, operator, value)
}

/// Append `expr` to `query`, joining with the AND connective when needed
pub fn append_and(query: &str, expr: &str) -> String {
    if query.is_empty() {
        expr.to_string()
    } else {
        format!("{} {} {}", query, AND, expr)
    }
}
