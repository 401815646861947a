// src/config/mod.rs
// Client configuration: defaults, config file, then environment

pub mod env;
pub mod file;

pub use env::{ConfigValidation, EnvConfig};
pub use file::FileConfig;

use std::time::Duration;
use tracing::info;

use crate::timezones::TimeZones;

/// Default backend location for a local install
pub const DEFAULT_BASE_URL: &str = "http://localhost:9898";

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL; every API path is joined onto it
    pub base_url: String,
    /// Whole-request timeout. Unset means requests wait for the backend.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// Zone used when a requested time zone is not recognized
    pub local_time_zone: String,
    pub extra_time_zones: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            local_time_zone: "UTC".to_string(),
            extra_time_zones: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from ~/.telescope/config.toml and the environment
    pub fn load() -> Self {
        let config = Self::from_sources(&FileConfig::load(), &EnvConfig::load());
        info!(base_url = %config.base_url, time_zone = %config.local_time_zone, "Client configuration loaded");
        config
    }

    /// Layer file config and environment overrides over the defaults
    pub fn from_sources(file: &FileConfig, env: &EnvConfig) -> Self {
        let mut config = Self::default();

        let section = &file.client;
        if let Some(url) = &section.base_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = section.timeout_secs {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = section.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(tz) = &section.time_zone {
            config.local_time_zone = tz.clone();
        }
        config.extra_time_zones = section.extra_time_zones.clone();

        if let Some(url) = &env.base_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = env.timeout_secs {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = env.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(tz) = &env.time_zone {
            config.local_time_zone = tz.clone();
        }

        config
    }

    /// Recognized time zones for this configuration
    pub fn time_zones(&self) -> TimeZones {
        TimeZones::new(&self.local_time_zone).with_extra(self.extra_time_zones.iter().cloned())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        match url::Url::parse(&self.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => validation.add_error(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => validation.add_error(format!("base_url '{}' is invalid: {}", self.base_url, e)),
        }

        if !self.time_zones().is_known(&self.local_time_zone) {
            validation.add_warning(format!(
                "local time zone '{}' is not a recognized zone name",
                self.local_time_zone
            ));
        }

        if self.connect_timeout.is_zero() {
            validation.add_warning("connect timeout is zero; connections will fail immediately");
        }

        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::ClientSection;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_sources(&FileConfig::default(), &EnvConfig::default());
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            client: ClientSection {
                base_url: Some("http://from-file".to_string()),
                timeout_secs: Some(30),
                connect_timeout_secs: None,
                time_zone: Some("Europe/London".to_string()),
                extra_time_zones: vec!["Custom/Zone".to_string()],
            },
        };
        let env = EnvConfig {
            base_url: Some("http://from-env".to_string()),
            timeout_secs: None,
            connect_timeout_secs: Some(2),
            time_zone: None,
        };

        let config = ClientConfig::from_sources(&file, &env);
        assert_eq!(config.base_url, "http://from-env");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.local_time_zone, "Europe/London");
        assert!(config.time_zones().is_known("Custom/Zone"));
    }

    #[test]
    fn test_validate_ok() {
        let validation = ClientConfig::default().validate();
        assert!(validation.is_valid(), "{}", validation.report());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_validate_bad_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(!config.validate().is_valid());

        let config = ClientConfig {
            base_url: "ftp://logs".to_string(),
            ..Default::default()
        };
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_validate_unknown_zone_warns() {
        let config = ClientConfig {
            local_time_zone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        let validation = config.validate();
        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
    }
}
