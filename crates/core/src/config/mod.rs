//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (COSMETIC_*)
//! 2. TOML config file (if COSMETIC_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! With an empty environment the AdGuard Base list is refreshed every 24 hours.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod list_url;
mod validation;

pub use list_url::{UrlError, filter_list_url};
pub use validation::ConfigError;

/// AdGuard Base filter list (Chromium build).
pub const DEFAULT_FILTER_URL: &str = "https://filters.adtidy.org/extension/chromium/filters/2.txt";

/// Refresh interval for the cached selector list.
pub const DEFAULT_UPDATE_INTERVAL_HOURS: u32 = 24;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Filter list to download.
    ///
    /// Set via COSMETIC_FILTER_URL environment variable.
    #[serde(default = "default_filter_url")]
    pub filter_url: String,

    /// Age after which the cached selectors are refetched.
    ///
    /// Set via COSMETIC_UPDATE_INTERVAL_HOURS environment variable.
    #[serde(default = "default_update_interval_hours")]
    pub update_interval_hours: u32,

    /// Path to the SQLite page storage database.
    ///
    /// Set via COSMETIC_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for the filter list request.
    ///
    /// Set via COSMETIC_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum filter list size in bytes.
    ///
    /// Set via COSMETIC_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Optional request timeout in milliseconds. Unset means the HTTP
    /// client's own behavior applies.
    ///
    /// Set via COSMETIC_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Whether the mutation watcher also tests each added element itself,
    /// not only its descendants.
    ///
    /// Set via COSMETIC_CHECK_ADDED_ROOT environment variable.
    #[serde(default = "default_true")]
    pub check_added_root: bool,
}

fn default_filter_url() -> String {
    DEFAULT_FILTER_URL.into()
}

fn default_update_interval_hours() -> u32 {
    DEFAULT_UPDATE_INTERVAL_HOURS
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./cosmetic-filter.sqlite")
}

fn default_user_agent() -> String {
    "cosmetic-filter/0.1".into()
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter_url: default_filter_url(),
            update_interval_hours: default_update_interval_hours(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
            check_added_root: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Refresh interval as a chrono Duration for timestamp arithmetic.
    pub fn update_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.update_interval_hours))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `COSMETIC_`
    /// 2. TOML file from `COSMETIC_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("COSMETIC_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("COSMETIC_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.filter_url, "https://filters.adtidy.org/extension/chromium/filters/2.txt");
        assert_eq!(config.update_interval_hours, 24);
        assert_eq!(config.db_path, PathBuf::from("./cosmetic-filter.sqlite"));
        assert_eq!(config.user_agent, "cosmetic-filter/0.1");
        assert_eq!(config.max_bytes, 20 * 1024 * 1024);
        assert!(config.timeout_ms.is_none());
        assert!(config.check_added_root);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig { timeout_ms: Some(1500), ..Default::default() };
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.update_interval(), chrono::Duration::hours(24));
        assert_eq!(AppConfig::default().timeout(), None);
    }

    #[test]
    fn test_load_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("COSMETIC_UPDATE_INTERVAL_HOURS", "6");
            jail.set_env("COSMETIC_CHECK_ADDED_ROOT", "false");
            jail.set_env("COSMETIC_TIMEOUT_MS", "5000");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.update_interval_hours, 6);
            assert!(!config.check_added_root);
            assert_eq!(config.timeout_ms, Some(5000));
            assert_eq!(config.filter_url, DEFAULT_FILTER_URL);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "cosmetic.toml",
                r#"
                    filter_url = "https://lists.example.org/base.txt"
                    update_interval_hours = 48
                "#,
            )?;
            jail.set_env("COSMETIC_CONFIG_FILE", "cosmetic.toml");
            jail.set_env("COSMETIC_UPDATE_INTERVAL_HOURS", "12");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.filter_url, "https://lists.example.org/base.txt");
            assert_eq!(config.update_interval_hours, 12);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.set_env("COSMETIC_UPDATE_INTERVAL_HOURS", "0");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { ref field, .. }) if field == "update_interval_hours"));
            Ok(())
        });
    }
}
