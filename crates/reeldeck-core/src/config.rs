//! Application configuration management.
//!
//! Handles loading, saving, and managing library-wide settings: where the
//! watch-state document lives and how to reach the tracking service.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::default_data_directory;

/// Default base URL of the tracking service API.
pub const DEFAULT_TRAKT_BASE_URL: &str = "https://api.trakt.tv";

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Tracking-service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraktConfig {
    /// Base URL of the tracking service API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Application client id sent with every request.
    #[serde(default)]
    pub client_id: String,
}

fn default_base_url() -> String {
    DEFAULT_TRAKT_BASE_URL.to_string()
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: String::new(),
        }
    }
}

impl TraktConfig {
    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the application client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory where the watch-state document is stored.
    pub data_directory: PathBuf,
    /// Tracking-service settings.
    #[serde(default)]
    pub trakt: TraktConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            trakt: TraktConfig::default(),
        }
    }
}

/// Manages loading and persisting the application configuration.
#[derive(Debug)]
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load the configuration from `path`, falling back to defaults when
    /// the file is missing or unreadable.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = path.into();
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let config = Self::load_or_default(&config_path);
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load the configuration from the default platform location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn load_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Configuration("No config directory available".to_string()))?;
        Self::load(dir.join("reeldeck").join(CONFIG_FILE))
    }

    fn load_or_default(path: &Path) -> AppConfig {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return AppConfig::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config, using defaults: {e}");
                    AppConfig::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config, using defaults: {e}");
                AppConfig::default()
            }
        }
    }

    /// Persist the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_path, content)?;
        debug!("Saved config to {}", self.config_path.display());
        Ok(())
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replace the configuration and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn update(&mut self, config: AppConfig) -> Result<()> {
        self.config = config;
        self.save()
    }
}
