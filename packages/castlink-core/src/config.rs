//! Control plane configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CastError, CastResult};
use crate::protocol_constants::{
    DEFAULT_APP_NAME, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_RESUME_THRESHOLD_SECS,
    DEFAULT_STATUS_POLL_INTERVAL_MS,
};

/// Configuration for the cast control plane.
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    /// Interval between status polls of the connected device (milliseconds).
    /// Override: `CASTLINK_POLL_INTERVAL_MS`
    pub status_poll_interval_ms: u64,

    /// DLNA reconnects resume at the current position only past this many seconds.
    /// Override: `CASTLINK_RESUME_THRESHOLD_SECS`
    pub resume_threshold_secs: f64,

    /// Application name prefixed to the media title shown on the renderer.
    /// Override: `CASTLINK_APP_NAME`
    pub app_name: String,

    /// Capacity of the event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            status_poll_interval_ms: DEFAULT_STATUS_POLL_INTERVAL_MS,
            resume_threshold_secs: DEFAULT_RESUME_THRESHOLD_SECS,
            app_name: DEFAULT_APP_NAME.to_string(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl CastConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    ///
    /// With no path, starts from the defaults.
    pub fn load(path: Option<&Path>) -> CastResult<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path).map_err(|e| {
                CastError::Configuration(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            serde_yaml::from_str(&content).map_err(|e| {
                CastError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CASTLINK_POLL_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                self.status_poll_interval_ms = interval;
            }
        }

        if let Ok(val) = std::env::var("CASTLINK_RESUME_THRESHOLD_SECS") {
            if let Ok(threshold) = val.parse() {
                self.resume_threshold_secs = threshold;
            }
        }

        if let Ok(val) = std::env::var("CASTLINK_APP_NAME") {
            if !val.trim().is_empty() {
                self.app_name = val;
            }
        }
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> CastResult<()> {
        if self.status_poll_interval_ms == 0 {
            return Err(CastError::Configuration(
                "status_poll_interval_ms must be >= 1 (tokio interval panics on 0)".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(CastError::Configuration(
                "event_channel_capacity must be >= 1 (broadcast::channel panics on 0)".to_string(),
            ));
        }
        if self.resume_threshold_secs.is_nan() || self.resume_threshold_secs < 0.0 {
            return Err(CastError::Configuration(
                "resume_threshold_secs must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Status poll interval as a [`Duration`].
    #[must_use]
    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let config = CastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.status_poll_interval(), Duration::from_secs(1));
        assert_eq!(config.resume_threshold_secs, 10.0);
    }

    #[test]
    fn rejects_zero_values() {
        let config = CastConfig {
            status_poll_interval_ms: 0,
            ..CastConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CastConfig {
            event_channel_capacity: 0,
            ..CastConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CastConfig {
            resume_threshold_secs: f64::NAN,
            ..CastConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_partial_yaml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "app_name: Living Room Player").unwrap();
        writeln!(file, "resume_threshold_secs: 5.5").unwrap();

        let config = CastConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.app_name, "Living Room Player");
        assert_eq!(config.resume_threshold_secs, 5.5);
        assert_eq!(
            config.event_channel_capacity,
            DEFAULT_EVENT_CHANNEL_CAPACITY
        );
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CastConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, CastError::Configuration(_)));
    }

    #[test]
    fn invalid_yaml_values_fail_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "event_channel_capacity: 0").unwrap();
        assert!(CastConfig::load(Some(file.path())).is_err());
    }
}
