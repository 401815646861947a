// src/config/file.rs
// File-based configuration from ~/.telescope/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub client: ClientSection,
}

/// `[client]` section
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ClientSection {
    /// Backend base URL, e.g. `http://localhost:9898`
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    /// Local time zone used when a requested zone is not recognized
    pub time_zone: Option<String>,
    /// Extra IANA zone names to accept on top of the built-in list
    #[serde(default)]
    pub extra_time_zones: Vec<String>,
}

impl FileConfig {
    /// Load config from ~/.telescope/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".telescope")
            .join("config.toml")
    }
}
