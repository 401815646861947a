// src/highlight.rs
// Marking searched-for values inside rendered log cells

use indexmap::IndexSet;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

use crate::stores::QueryState;

/// Opening tag wrapped around each match
pub const HIGHLIGHT_OPEN: &str = r#"<span class="bg-orange-300 dark:bg-orange-700 dark:text-white">"#;
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// Rendered in place of null or empty values
pub const EMPTY_PLACEHOLDER: &str = "&dash;";

/// `key<op>value` comparisons in a FlyQL query. The value is double quoted,
/// single quoted, or runs until whitespace or a parenthesis.
static FLYQL_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"(?i)(?:^|[\s(])[\w.]+\s*(?:=|:|!=|~|!~)\s*(?:"([^"]+)"|'([^']+)'|([^\s()]+))"#)
        .expect("flyql value regex")
});

/// `key like '%value%'` in a raw query
static LIKE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)(?:^|[\s(])[\w.]+\s+like\s+'%([^']+)%'").expect("like value regex")
});

/// Keywords extracted from the current queries plus the pattern that marks them
#[derive(Debug, Clone)]
pub struct Highlighter {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn from_queries(query: &str, raw_query: &str) -> Self {
        let keywords = extract_keywords(query, raw_query);
        let pattern = build_pattern(&keywords);
        Self { keywords, pattern }
    }

    pub fn from_state(state: &QueryState) -> Self {
        Self::from_queries(&state.query, &state.raw_query)
    }

    /// Distinct keywords in the order they were found
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Render `value` as escaped HTML with every keyword occurrence wrapped
    /// in a highlight span. Matching is case-insensitive and prefers the
    /// longest keyword.
    pub fn highlight(&self, value: &Value) -> String {
        let Some(text) = display_text(value) else {
            return EMPTY_PLACEHOLDER.to_string();
        };
        let escaped = html_escape::encode_safe(&text);

        match &self.pattern {
            Some(re) => re
                .replace_all(&escaped, |caps: &Captures| match caps.name("entity") {
                    Some(entity) => entity.as_str().to_string(),
                    None => format!("{}{}{}", HIGHLIGHT_OPEN, &caps[0], HIGHLIGHT_CLOSE),
                })
                .into_owned(),
            None => escaped.into_owned(),
        }
    }

    /// [`Highlighter::highlight`] for plain text
    pub fn highlight_str(&self, value: &str) -> String {
        self.highlight(&Value::String(value.to_string()))
    }
}

/// Values the user searched for in `query` (FlyQL) and `raw_query`
pub fn extract_keywords(query: &str, raw_query: &str) -> Vec<String> {
    let mut keywords: IndexSet<String> = IndexSet::new();

    for caps in FLYQL_VALUE_RE.captures_iter(query) {
        let Some(m) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };
        let value = strip_wildcards(m.as_str());
        if !value.is_empty() {
            keywords.insert(value.to_string());
        }
    }

    for caps in LIKE_VALUE_RE.captures_iter(raw_query) {
        if let Some(m) = caps.get(1) {
            keywords.insert(m.as_str().to_string());
        }
    }

    keywords.into_iter().filter(|k| !k.is_empty()).collect()
}

fn strip_wildcards(value: &str) -> &str {
    let value = value.strip_prefix('*').unwrap_or(value);
    value.strip_suffix('*').unwrap_or(value)
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(_) | Value::Array(_) => {
            Some(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
        }
        other => Some(other.to_string()),
    }
}

/// Character references produced by escaping; matched after the keywords
/// so a keyword never starts inside one.
const ENTITY_PATTERN: &str = r"(?P<entity>&(?:[a-z]+|#x?[0-9a-f]+);)";

/// Case-insensitive alternation of the escaped keywords, longest first
fn build_pattern(keywords: &[String]) -> Option<Regex> {
    if keywords.is_empty() {
        return None;
    }

    let mut sorted: Vec<&String> = keywords.iter().collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let parts: Vec<String> = sorted
        .into_iter()
        .map(|k| regex::escape(&html_escape::encode_safe(k)))
        .collect();

    match Regex::new(&format!("(?i)(?:{})|{}", parts.join("|"), ENTITY_PATTERN)) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, keywords = keywords.len(), "Could not build highlight pattern");
            None
        }
    }
}
