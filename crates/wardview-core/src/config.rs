//! Application configuration management.
//!
//! Configuration is stored at `~/.config/wardview/config.json`. Every field
//! has a default, so a partial or missing file still loads. The backend URL
//! can be overridden with the `WARDVIEW_API_URL` environment variable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pagination::PaginationSettings;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "wardview";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "WARDVIEW_API_URL";

const DEFAULT_BASE_URL: &str = "https://backhospital.onrender.com/api";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Signed-in clinician shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub name: String,
    pub email: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            name: "Dr. Marcelo".to_string(),
            email: "marcelo@email.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub pagination: PaginationSettings,
    pub profile: ProfileSettings,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_json(&contents).with_context(|| format!("Invalid config in {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
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

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the log file.
    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply `WARDVIEW_API_URL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_url(std::env::var(API_URL_ENV).ok());
    }

    fn apply_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            self.api.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("api.request_timeout_secs must be at least 1");
        }
        if self.pagination.server_page_size == 0 {
            anyhow::bail!("pagination.server_page_size must be at least 1");
        }
        if self.pagination.client_page_size == 0 {
            anyhow::bail!("pagination.client_page_size must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.pagination.server_page_size, 10);
        assert_eq!(config.pagination.client_page_size, 5);
        assert_eq!(config.pagination.first_server_page, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_json(r#"{"pagination": {"client_page_size": 8}}"#).expect("config");
        assert_eq!(config.pagination.client_page_size, 8);
        assert_eq!(config.pagination.server_page_size, 10);
        assert_eq!(config.profile, ProfileSettings::default());
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:3000/api".to_string();
        config.profile.name = "Dra. Lucía".to_string();
        let json = serde_json::to_string_pretty(&config).expect("serialize");
        assert_eq!(Config::from_json(&json).expect("parse"), config);
    }

    #[test]
    fn test_api_url_override() {
        let mut config = Config::default();
        config.apply_api_url(Some("  http://10.0.0.5/api ".to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");

        config.apply_api_url(Some("   ".to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");

        config.apply_api_url(None);
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pagination.client_page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_url = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
