//! Configuration validation rules.
//!
//! Validation logic for `AppConfig` values after they have been loaded
//! from environment, files, or defaults.

use crate::config::AppConfig;
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
    /// - `version_tag` or `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - `api_marker` does not start with `/`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version_tag.is_empty() {
            return Err(ConfigError::Invalid { field: "version_tag".into(), reason: "must not be empty".into() });
        }

        if !self.origin.starts_with("http://") && !self.origin.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: "must be an absolute http:// or https:// URL".into(),
            });
        }

        if !self.api_marker.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "api_marker".into(),
                reason: "must be an absolute path segment starting with /".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.precache.is_empty() {
            tracing::warn!("precache list is empty; install will store nothing");
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
    fn test_validate_empty_version_tag() {
        let config = AppConfig { version_tag: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "version_tag"));
    }

    #[test]
    fn test_validate_relative_origin() {
        let config = AppConfig { origin: "localhost:5000".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_validate_api_marker_without_slash() {
        let config = AppConfig { api_marker: "ask".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_marker"));
    }

    #[test]
    fn test_validate_max_bytes_bounds() {
        let zero = AppConfig { max_bytes: 0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));

        let huge = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        assert!(matches!(huge.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let small = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(small.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let large = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(large.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
