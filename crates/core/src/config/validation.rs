//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, filter_list_url};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `filter_url` is not an absolute http(s) URL
    /// - `update_interval_hours` is 0 or exceeds one year
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is set and below 100ms or above 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = filter_list_url(&self.filter_url) {
            return Err(ConfigError::Invalid { field: "filter_url".into(), reason: e.to_string() });
        }

        if self.update_interval_hours == 0 {
            return Err(ConfigError::Invalid {
                field: "update_interval_hours".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.update_interval_hours > 24 * 365 {
            return Err(ConfigError::Invalid {
                field: "update_interval_hours".into(),
                reason: "must not exceed one year (8760h)".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !self.check_added_root {
            tracing::debug!("mutation watcher will only query descendants of added nodes");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_filter_url_scheme() {
        let config = AppConfig { filter_url: "ftp://filters.example.org/2.txt".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "filter_url"));
    }

    #[test]
    fn test_validate_filter_url_relative() {
        let config = AppConfig { filter_url: "filters/2.txt".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "filter_url"));
    }

    #[test]
    fn test_validate_filter_url_matches_fetcher_rules() {
        let blank = AppConfig { filter_url: "   ".into(), ..Default::default() };
        let err = blank.validate().unwrap_err().to_string();
        assert!(err.contains("empty URL"), "{err}");

        let padded = AppConfig { filter_url: " https://example.org/list.txt#top ".into(), ..Default::default() };
        assert!(padded.validate().is_ok());
        assert!(filter_list_url(&padded.filter_url).is_ok());
    }

    #[test]
    fn test_validate_interval_bounds() {
        let zero = AppConfig { update_interval_hours: 0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid { field, .. }) if field == "update_interval_hours"));

        let huge = AppConfig { update_interval_hours: 24 * 365 + 1, ..Default::default() };
        assert!(matches!(huge.validate(), Err(ConfigError::Invalid { field, .. }) if field == "update_interval_hours"));

        let max = AppConfig { update_interval_hours: 24 * 365, ..Default::default() };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes() {
        let zero = AppConfig { max_bytes: 0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));

        let over = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        assert!(matches!(over.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_when_set() {
        let small = AppConfig { timeout_ms: Some(50), ..Default::default() };
        assert!(matches!(small.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let large = AppConfig { timeout_ms: Some(301_000), ..Default::default() };
        assert!(matches!(large.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let edge = AppConfig { timeout_ms: Some(100), ..Default::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
