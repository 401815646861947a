// src/query/params.rs
// URL query parameters as seen by the router

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix marking a context column in the URL (`ctx_host=web-1`)
pub const CONTEXT_PREFIX: &str = "ctx_";

/// Ordered URL query parameters. The first occurrence of a repeated key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams(IndexMap<String, String>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=two`, with or without a leading `?`
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = IndexMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self(params)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `ctx_<name>` entries, yielded as `(name, value)`
    pub fn context_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter_map(|(k, v)| k.strip_prefix(CONTEXT_PREFIX).map(|name| (name, v)))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            let key = k.into();
            if !params.contains(&key) {
                params.insert(key, v);
            }
        }
        params
    }
}

/// Parse a non-negative count such as `limit` or `max_lines`
pub fn parse_count(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

/// Interpret a URL flag, returning `default` for anything unrecognized
pub fn bool_from_str(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_string() {
        let params = RouteParams::from_query_string("?columns=a%2C+b&limit=10&query=level%3Derror");
        assert_eq!(params.get("columns"), Some("a, b"));
        assert_eq!(params.get("limit"), Some("10"));
        assert_eq!(params.get("query"), Some("level=error"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let params = RouteParams::from_query_string("limit=1&limit=2");
        assert_eq!(params.get("limit"), Some("1"));
    }

    #[test]
    fn test_context_columns() {
        let params = RouteParams::new()
            .with("ctx_ip", "1.2.3.4")
            .with("limit", "5")
            .with("ctx_host", "web-1")
            .with("ctxnope", "x");
        let ctx: Vec<_> = params.context_columns().collect();
        assert_eq!(ctx, vec![("ip", "1.2.3.4"), ("host", "web-1")]);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("15"), Some(15));
        assert_eq!(parse_count(" 7 "), Some(7));
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_bool_from_str() {
        assert!(bool_from_str("true", false));
        assert!(!bool_from_str("false", true));
        assert!(!bool_from_str("0", true));
        assert!(bool_from_str("garbage", true));
        assert!(!bool_from_str("garbage", false));
    }
}
