//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{Result, StoreError};
use chrono::Duration;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the bucketlock.yaml file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(StoreError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, or use defaults if the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| StoreError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StoreError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `prefix` must be non-empty and must not start or end with `/`
    /// - `lock_stale_minutes` must be positive
    /// - `lock_poll_interval_ms` must be positive
    /// - `root` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(StoreError::Config(
                "config validation failed: prefix must be non-empty".to_string(),
            ));
        }
        if self.prefix.starts_with('/') || self.prefix.ends_with('/') {
            return Err(StoreError::Config(format!(
                "config validation failed: prefix must not start or end with '/' (found '{}'). Use '{}' instead.",
                self.prefix,
                self.prefix.trim_matches('/')
            )));
        }

        if self.lock_stale_minutes == 0 {
            return Err(StoreError::Config(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.lock_poll_interval_ms == 0 {
            return Err(StoreError::Config(
                "config validation failed: lock_poll_interval_ms must be greater than 0"
                    .to_string(),
            ));
        }

        if self.root.is_empty() {
            return Err(StoreError::Config(
                "config validation failed: root must be non-empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The stale threshold as a duration.
    pub fn stale_threshold(&self) -> Duration {
        Duration::minutes(i64::from(self.lock_stale_minutes))
    }

    /// The lock poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.lock_poll_interval_ms).unwrap_or(i64::MAX))
    }
}
