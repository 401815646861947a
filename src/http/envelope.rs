// src/http/envelope.rs
// The response envelope every backend endpoint returns

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-field validation outcome of a form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default = "default_true")]
    pub result: bool,
    /// Field name to message. Multiple messages for a field are joined with ", ".
    #[serde(default, deserialize_with = "deserialize_field_messages")]
    pub columns: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            result: true,
            columns: BTreeMap::new(),
        }
    }
}

impl Validation {
    pub fn message(&self, field: &str) -> Option<&str> {
        self.columns.get(field).map(String::as_str)
    }

    pub fn is_ok(&self) -> bool {
        self.result && self.columns.is_empty()
    }
}

fn deserialize_field_messages<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(field, value)| (field, flatten_message(&value)))
        .collect())
}

fn flatten_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_message)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Normalized `{result, data, errors, messages, validation}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Informational messages ("User alice has been created")
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub validation: Validation,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            result: false,
            data: None,
            errors: Vec::new(),
            messages: Vec::new(),
            validation: Validation::default(),
        }
    }
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            result: true,
            data: Some(data),
            ..Default::default()
        }
    }

    /// A failed envelope carrying a single error
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            result: false,
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All errors joined for display; empty when there are none
    pub fn error_string(&self) -> String {
        self.errors.join(", ")
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    /// Replace the payload, keeping status, errors, messages and validation
    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        Envelope {
            result: self.result,
            data: self.data.map(f),
            errors: self.errors,
            messages: self.messages,
            validation: self.validation,
        }
    }

    /// Drop the payload
    pub fn without_data<U>(self) -> Envelope<U> {
        Envelope {
            result: self.result,
            data: None,
            errors: self.errors,
            messages: self.messages,
            validation: self.validation,
        }
    }
}

impl Envelope<Value> {
    /// Re-type the JSON payload.
    ///
    /// A payload that does not match `T` on a successful response turns the
    /// envelope into a failure; on an already failed response it is dropped.
    pub fn decode<T: DeserializeOwned>(self) -> Envelope<T> {
        let Envelope {
            result,
            data,
            mut errors,
            messages,
            validation,
        } = self;

        let (result, data) = match data {
            None | Some(Value::Null) => (result, None),
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => (result, Some(decoded)),
                Err(e) if result => {
                    errors.push(format!("failed to decode response: {}", e));
                    (false, None)
                }
                Err(_) => (false, None),
            },
        };

        Envelope {
            result,
            data,
            errors,
            messages,
            validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_deserialize_full_envelope() {
        let env: Envelope = serde_json::from_value(json!({
            "result": true,
            "data": [{"id": 1}],
            "errors": [],
            "messages": ["done"],
            "validation": {"result": true, "columns": {}}
        }))
        .unwrap();
        assert!(env.result);
        assert_eq!(env.messages, vec!["done"]);
        assert!(env.validation.is_ok());
    }

    #[test]
    fn test_missing_fields_default() {
        let env: Envelope = serde_json::from_value(json!({})).unwrap();
        assert!(!env.result);
        assert!(env.data.is_none());
        assert!(env.errors.is_empty());
        assert!(env.validation.result);
    }

    #[test]
    fn test_validation_lists_are_joined() {
        let env: Envelope = serde_json::from_value(json!({
            "result": true,
            "validation": {
                "result": false,
                "columns": {
                    "username": ["This field is required.", "Too short."],
                    "password": "Passwords do not match"
                }
            }
        }))
        .unwrap();
        assert!(!env.validation.result);
        assert_eq!(
            env.validation.message("username"),
            Some("This field is required., Too short.")
        );
        assert_eq!(env.validation.message("password"), Some("Passwords do not match"));
        assert_eq!(env.validation.message("email"), None);
    }

    #[test]
    fn test_error_string() {
        let mut env: Envelope = Envelope::failed("first");
        env.errors.push("second".into());
        assert_eq!(env.error_string(), "first, second");
        assert_eq!(env.first_error(), Some("first"));

        let ok: Envelope = Envelope::ok(json!(1));
        assert_eq!(ok.error_string(), "");
        assert_eq!(ok.first_error(), None);
    }

    #[test]
    fn test_decode_success() {
        let env: Envelope = Envelope::ok(json!([{"id": 7}]));
        let typed: Envelope<Vec<Item>> = env.decode();
        assert!(typed.result);
        assert_eq!(typed.data, Some(vec![Item { id: 7 }]));
    }

    #[test]
    fn test_decode_mismatch_marks_failure() {
        let env: Envelope = Envelope::ok(json!({"unexpected": true}));
        let typed: Envelope<Vec<Item>> = env.decode();
        assert!(!typed.result);
        assert!(typed.data.is_none());
        assert!(typed.error_string().contains("failed to decode"));
    }

    #[test]
    fn test_decode_failed_envelope_keeps_errors() {
        let mut env: Envelope = Envelope::failed("failed to get users: boom");
        env.data = Some(json!({}));
        let typed: Envelope<Vec<Item>> = env.decode();
        assert!(!typed.result);
        assert_eq!(typed.errors, vec!["failed to get users: boom"]);
    }

    #[test]
    fn test_map_and_without_data() {
        let env = Envelope::ok(2).map(|n| n * 21);
        assert_eq!(env.data, Some(42));
        let bare: Envelope<()> = env.without_data();
        assert!(bare.result);
        assert!(bare.data.is_none());
    }
}
