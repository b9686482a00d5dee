//! Configuration system
//!
//! Bridge tunables (idle budget, refresh rate) plus the file loading trait
//! shared by every serializable config type in the crate.

pub use serde::{Serialize, Deserialize};
use std::time::Duration;

use crate::pacer::DEFAULT_IDLE_BUDGET;

/// Refresh rate used when none is configured
pub const DEFAULT_REFRESH_RATE_HZ: f64 = 60.0;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// # Bridge Configuration
///
/// Tunables for windows and apps created through the bridge. The defaults
/// match a 60 Hz display with the standard twelve tick idle budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Ticks the pacer keeps firing after the last frame request
    pub idle_budget: u32,
    /// Rate used by the threaded refresh source, in Hz
    pub refresh_rate_hz: f64,
    /// Name given to refresh source threads
    pub thread_name: String,
}

impl BridgeConfig {
    /// Set the idle budget
    pub fn with_idle_budget(mut self, idle_budget: u32) -> Self {
        self.idle_budget = idle_budget;
        self
    }

    /// Set the refresh rate
    pub fn with_refresh_rate(mut self, refresh_rate_hz: f64) -> Self {
        self.refresh_rate_hz = refresh_rate_hz;
        self
    }

    /// Interval between two refresh ticks
    ///
    /// Falls back to the default rate when the configured one has no
    /// representable interval; [`validate`](Self::validate) rejects those.
    pub fn refresh_interval(&self) -> Duration {
        Self::interval_for(self.refresh_rate_hz)
            .unwrap_or_else(|| Duration::from_secs_f64(1.0 / DEFAULT_REFRESH_RATE_HZ))
    }

    fn interval_for(rate_hz: f64) -> Option<Duration> {
        Duration::try_from_secs_f64(1.0 / rate_hz)
            .ok()
            .filter(|interval| !interval.is_zero())
    }

    /// Check that the configuration can drive a pacer
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_budget == 0 {
            return Err(ConfigError::Invalid {
                field: "idle_budget",
                reason: "must be at least one tick".to_string(),
            });
        }
        if !self.refresh_rate_hz.is_finite() || self.refresh_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "refresh_rate_hz",
                reason: format!("{} is not a positive rate", self.refresh_rate_hz),
            });
        }
        if Self::interval_for(self.refresh_rate_hz).is_none() {
            return Err(ConfigError::Invalid {
                field: "refresh_rate_hz",
                reason: format!("{} Hz has no usable tick interval", self.refresh_rate_hz),
            });
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            idle_budget: DEFAULT_IDLE_BUDGET,
            refresh_rate_hz: DEFAULT_REFRESH_RATE_HZ,
            thread_name: "frame-bridge-refresh".to_string(),
        }
    }
}

impl Config for BridgeConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BridgeConfig::default();
        assert_eq!(config.idle_budget, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = BridgeConfig::default().with_idle_budget(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "idle_budget", .. })
        ));
    }

    #[test]
    fn test_bad_refresh_rate_rejected() {
        assert!(BridgeConfig::default().with_refresh_rate(0.0).validate().is_err());
        assert!(BridgeConfig::default().with_refresh_rate(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_extreme_refresh_rates_rejected() {
        let slow = BridgeConfig::default().with_refresh_rate(1e-30);
        assert!(matches!(
            slow.validate(),
            Err(ConfigError::Invalid { field: "refresh_rate_hz", .. })
        ));
        assert_eq!(slow.refresh_interval(), Duration::from_secs_f64(1.0 / 60.0));

        let fast = BridgeConfig::default().with_refresh_rate(1e30);
        assert!(fast.validate().is_err());
        assert!(!fast.refresh_interval().is_zero());

        assert!(BridgeConfig::default().with_refresh_rate(1e-6).validate().is_ok());
    }

    #[test]
    fn test_refresh_interval() {
        let config = BridgeConfig::default().with_refresh_rate(50.0);
        assert_eq!(config.refresh_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BridgeConfig = toml::from_str("idle_budget = 4").unwrap();
        assert_eq!(config.idle_budget, 4);
        assert_eq!(config.refresh_rate_hz, 60.0);
    }

    #[test]
    fn test_toml_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("frame_bridge_{}.toml", std::process::id()));
        let path = path.to_str().unwrap().to_string();

        let config = BridgeConfig::default().with_idle_budget(30).with_refresh_rate(120.0);
        config.save_to_file(&path).unwrap();
        let loaded = BridgeConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = BridgeConfig::default().save_to_file("bridge.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
