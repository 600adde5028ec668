//! Application configuration management.
//!
//! Configuration covers the backend base URL and the request timeout.
//! Values come from the config file at the platform config directory,
//! with an environment override for development builds pointed at a
//! local backend.
//!
//! Configuration is stored at `~/.config/newhope/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "newhope";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Production backend base URL
pub const DEFAULT_API_BASE_URL: &str = "https://new-hope-e46616a5d911.herokuapp.com";

/// Environment variable overriding the backend base URL
const ENV_API_URL: &str = "NEWHOPE_API_URL";

/// HTTP request timeout in seconds.
/// 30s allows for slow mobile connections while failing fast enough
/// that a dead backend does not leave the user staring at a spinner.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Configuration pointed at a specific backend, for tests and
    /// development builds.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            api_base_url: base_url,
            ..Self::default()
        }
    }

    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        // A missing .env file is not an error
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
