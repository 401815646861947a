// src/http/client.rs
// reqwest-backed transport with a session cookie jar

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::{Envelope, Transport};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Cookie set by the backend for CSRF protection
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header carrying the CSRF token on unsafe requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP transport for the Telescope backend.
///
/// Cookies (session and CSRF) persist for the lifetime of the client, so a
/// login through [`crate::services::AuthService`] authenticates later calls.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = normalize_base(&config.base_url)?;
        let jar = Arc::new(Jar::default());

        let mut builder = Client::builder()
            .cookie_provider(jar.clone())
            .redirect(Policy::none())
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            jar,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an API path onto the base URL. Leading slashes are ignored so
    /// `ui/v1/x` and `/ui/v1/x` resolve the same way.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Current CSRF token from the cookie jar, if the backend has set one
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let cookies = header.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_string())
        })
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<(StatusCode, String)> {
        let url = self.url_for(path)?;
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.client.request(method.clone(), url);
        if !is_safe(&method) {
            if let Some(token) = self.csrf_token() {
                request = request.header(CSRF_HEADER, token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(method = %method, path, status = %status, bytes = text.len(), "Received response");
        Ok((status, text))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Envelope {
        match self.send(method.clone(), path, body.as_ref()).await {
            Ok((status, text)) => envelope_from_response(status, &text),
            Err(e) => {
                warn!(method = %method, path, error = %e, "Request failed");
                Envelope::failed(e.to_user_string())
            }
        }
    }
}

fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!("'{}' cannot be used as a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Turn a raw HTTP response into an envelope.
///
/// Envelope bodies are honored even on error statuses; a non-success status
/// always yields a failed envelope with at least one error.
pub(crate) fn envelope_from_response(status: StatusCode, body: &str) -> Envelope {
    let parsed = serde_json::from_str::<Value>(body).ok();

    let mut envelope = match &parsed {
        Some(value @ Value::Object(_)) => match serde_json::from_value::<Envelope>(value.clone()) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                warn!(status = %status, error = %e, "Response is not an envelope");
                return Envelope::failed(format!("invalid response from server (HTTP {})", status));
            }
            Err(_) => Envelope::default(),
        },
        _ if status.is_success() => {
            return Envelope::failed(format!("invalid response from server (HTTP {})", status));
        }
        _ => Envelope::default(),
    };

    if !status.is_success() {
        envelope.result = false;
        if envelope.errors.is_empty() {
            let detail = parsed
                .as_ref()
                .and_then(|v| v.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string);
            envelope.errors.push(detail.unwrap_or_else(|| format!("HTTP {}", status)));
        }
    }

    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client_for(base: &str) -> HttpClient {
        HttpClient::new(&ClientConfig {
            base_url: base.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    // ========================================================================
    // URL handling
    // ========================================================================

    #[test]
    fn test_url_for_relative_and_absolute_paths() {
        let client = client_for("http://localhost:9898");
        assert_eq!(
            client.url_for("ui/v1/rbac/users").unwrap().as_str(),
            "http://localhost:9898/ui/v1/rbac/users"
        );
        assert_eq!(
            client.url_for("/ui/v1/auth/login").unwrap().as_str(),
            "http://localhost:9898/ui/v1/auth/login"
        );
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let client = client_for("https://example.com/telescope");
        assert_eq!(
            client.url_for("/logout").unwrap().as_str(),
            "https://example.com/telescope/logout"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpClient::new(&ClientConfig {
            base_url: "no scheme here".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ClientError::Url(_))));
    }

    #[test]
    fn test_csrf_token_from_jar() {
        let client = client_for("http://localhost:9898");
        assert_eq!(client.csrf_token(), None);

        let url = Url::parse("http://localhost:9898/").unwrap();
        client.jar.add_cookie_str("sessionid=abc; Path=/", &url);
        client.jar.add_cookie_str("csrftoken=tok123; Path=/", &url);
        assert_eq!(client.csrf_token().as_deref(), Some("tok123"));
    }

    // ========================================================================
    // Response normalization
    // ========================================================================

    #[test]
    fn test_envelope_from_success() {
        let env = envelope_from_response(StatusCode::OK, r#"{"result":true,"data":[1,2]}"#);
        assert!(env.result);
        assert_eq!(env.data, Some(serde_json::json!([1, 2])));
    }

    #[test]
    fn test_envelope_from_error_status_with_envelope() {
        let env = envelope_from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"result":false,"errors":["Invalid credentials"]}"#,
        );
        assert!(!env.result);
        assert_eq!(env.errors, vec!["Invalid credentials"]);
    }

    #[test]
    fn test_envelope_from_error_status_with_detail() {
        let env = envelope_from_response(
            StatusCode::FORBIDDEN,
            r#"{"detail":"Authentication credentials were not provided."}"#,
        );
        assert!(!env.result);
        assert_eq!(env.errors, vec!["Authentication credentials were not provided."]);
    }

    #[test]
    fn test_envelope_from_redirect() {
        let env = envelope_from_response(StatusCode::FOUND, "");
        assert!(!env.result);
        assert_eq!(env.errors, vec!["HTTP 302 Found"]);
    }

    #[test]
    fn test_envelope_from_malformed_object_success() {
        let env = envelope_from_response(StatusCode::OK, r#"{"result": "yes", "errors": "boom"}"#);
        assert!(!env.result);
        assert_eq!(env.errors, vec!["invalid response from server (HTTP 200 OK)"]);
    }

    #[test]
    fn test_envelope_from_malformed_object_error_status() {
        let env = envelope_from_response(StatusCode::BAD_GATEWAY, r#"{"result": "yes"}"#);
        assert!(!env.result);
        assert_eq!(env.errors, vec!["HTTP 502 Bad Gateway"]);
    }

    #[test]
    fn test_envelope_from_html_success() {
        let env = envelope_from_response(StatusCode::OK, "<html>login</html>");
        assert!(!env.result);
        assert!(env.error_string().contains("invalid response"));
    }

    // ========================================================================
    // Transport errors become envelopes
    // ========================================================================

    #[tokio::test]
    async fn test_connection_refused_is_an_envelope() {
        let client = HttpClient::new(&ClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            connect_timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();
        let env = client.get("ui/v1/rbac/users").await;
        assert!(!env.result);
        assert!(env.has_errors());
    }
}
