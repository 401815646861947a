// src/error.rs
// Standardized error types for the Telescope client

use thiserror::Error;

/// Main error type for the Telescope client library
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no source selected")]
    SourceNotSet,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("unknown error: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Convert to a user-facing string for display surfaces
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }
}

impl From<String> for ClientError {
    fn from(s: String) -> Self {
        ClientError::Other(s)
    }
}

impl From<ClientError> for String {
    fn from(err: ClientError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let err = ClientError::InvalidInput("bad column".to_string());
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("bad column"));
    }

    #[test]
    fn test_source_not_set_error() {
        let err = ClientError::SourceNotSet;
        assert_eq!(err.to_string(), "no source selected");
    }

    #[test]
    fn test_api_error() {
        let err = ClientError::Api("Invalid credentials".to_string());
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn test_from_string() {
        let err: ClientError = "something odd".to_string().into();
        assert!(matches!(err, ClientError::Other(_)));
        assert!(err.to_string().contains("something odd"));
    }

    #[test]
    fn test_into_string() {
        let err = ClientError::Config("missing url".to_string());
        let s: String = err.into();
        assert!(s.contains("configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: ClientError = url_err.into();
        assert!(matches!(err, ClientError::Url(_)));
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn test_to_user_string() {
        let err = ClientError::SourceNotSet;
        assert_eq!(err.to_user_string(), err.to_string());
    }
}
