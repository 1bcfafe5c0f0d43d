//! Configuration management for Vigil.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/vigil/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing store settings
    pub storage: StorageConfig,
    /// Poll cycle settings
    pub polling: PollingConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `VIGIL_DB_PATH`: Override the listing store path
    /// - `VIGIL_POLL_MINUTES`: Override the poll interval
    /// - `VIGIL_HEADLESS`: Override browser headless mode (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("VIGIL_DB_PATH") {
            config.storage.db_path = Some(PathBuf::from(&val));
            tracing::debug!("Override storage.db_path from env: {}", val);
        }

        if let Ok(val) = std::env::var("VIGIL_POLL_MINUTES") {
            if let Ok(minutes) = val.parse() {
                config.polling.interval_minutes = minutes;
                tracing::debug!("Override polling.interval_minutes from env: {}", minutes);
            }
        }

        if let Ok(val) = std::env::var("VIGIL_HEADLESS") {
            if let Ok(headless) = val.parse() {
                config.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/vigil/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "vigil", "vigil").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/vigil`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "vigil", "vigil").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the listing store path, defaulting to `<data_dir>/vigil.db`.
    pub fn resolved_db_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("vigil.db")),
        }
    }
}

/// Listing store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite store; `None` uses the XDG data directory.
    pub db_path: Option<PathBuf>,
}

/// Poll cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Minutes between poll cycles, enforced by the caller's scheduler.
    pub interval_minutes: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Milliseconds to wait after loading a search's first page before
    /// the first extraction attempt.
    pub settle_delay_ms: u64,
    /// Optional safety ceiling on pages crawled per search. The site's
    /// result depth is unknown, so the default is no ceiling.
    pub max_pages: Option<u32>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            settle_delay_ms: 1000,
            max_pages: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.storage.db_path.is_none());
        assert_eq!(config.polling.interval_minutes, 15);
        assert!(config.browser.headless);
        assert_eq!(config.browser.settle_delay_ms, 1000);
        assert!(config.browser.max_pages.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::default();
        config.polling.interval_minutes = 5;
        config.browser.max_pages = Some(20);

        let toml_str = toml::to_string_pretty(&config).expect("serialize config");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse config");

        assert_eq!(parsed.polling.interval_minutes, 5);
        assert_eq!(parsed.browser.max_pages, Some(20));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [polling]
            interval_minutes = 30
        "#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.polling.interval_minutes, 30);
        // Unspecified sections fall back to defaults
        assert!(config.browser.headless);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_resolved_db_path_override() {
        let mut config = AppConfig::default();
        config.storage.db_path = Some(PathBuf::from("/tmp/custom.db"));

        let path = config.resolved_db_path().expect("resolve db path");
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }
}
