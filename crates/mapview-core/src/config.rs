//! Layered viewer configuration.
//!
//! Thresholds default to the values the planning tool's exports were tuned
//! against, can be overridden from a TOML file, and finally from `MAPVIEW_*`
//! environment variables. The three speed-related constants (low-speed
//! threshold, default display speed, error display threshold) are deliberately
//! independent; none is derived from another.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{MapviewError, Result};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the viewer core.
#[derive(Debug, Clone)]
pub struct MapviewConfig {
    /// Paired-edge width below which a road is flagged narrow, in map units.
    pub narrow_threshold: ConfigValue<f64>,
    /// Age beyond which a reference shape is stale, in hours (exclusive).
    pub stale_max_age_hours: ConfigValue<i64>,
    /// Age within which a shape counts as recently updated, in hours (inclusive).
    pub recent_max_age_hours: ConfigValue<i64>,
    /// Speed below which a shape is flagged low-speed, in km/h (exclusive).
    pub low_speed_kph: ConfigValue<f64>,
    /// Display speed substituted when a shape carries no limit, in m/s.
    pub default_speed_mps: ConfigValue<f64>,
    /// Displayed speeds above this render as an error label, in km/h.
    pub error_display_kph: ConfigValue<f64>,
}

impl Default for MapviewConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MapviewConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            narrow_threshold: ConfigValue::new(10.0, ConfigSource::Default),
            stale_max_age_hours: ConfigValue::new(24, ConfigSource::Default),
            recent_max_age_hours: ConfigValue::new(48, ConfigSource::Default),
            low_speed_kph: ConfigValue::new(31.0, ConfigSource::Default),
            default_speed_mps: ConfigValue::new(50.0, ConfigSource::Default),
            error_display_kph: ConfigValue::new(51.0, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| MapviewError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| MapviewError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(v) = file_config.narrow_threshold {
            self.narrow_threshold.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.stale_max_age_hours {
            self.stale_max_age_hours.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.recent_max_age_hours {
            self.recent_max_age_hours.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.low_speed_kph {
            self.low_speed_kph.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.default_speed_mps {
            self.default_speed_mps.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.error_display_kph {
            self.error_display_kph.update(v, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(v) = env_f64("MAPVIEW_NARROW_THRESHOLD") {
            self.narrow_threshold.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_i64("MAPVIEW_STALE_MAX_AGE_HOURS") {
            self.stale_max_age_hours.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_i64("MAPVIEW_RECENT_MAX_AGE_HOURS") {
            self.recent_max_age_hours.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_f64("MAPVIEW_LOW_SPEED_KPH") {
            self.low_speed_kph.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_f64("MAPVIEW_DEFAULT_SPEED_MPS") {
            self.default_speed_mps.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_f64("MAPVIEW_ERROR_DISPLAY_KPH") {
            self.error_display_kph.update(v, ConfigSource::Environment);
        }
        self
    }
}

fn env_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a number", key, raw);
            None
        }
    }
}

fn env_i64(key: &str) -> Option<i64> {
    let raw = env::var(key).ok()?;
    match raw.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected an integer", key, raw);
            None
        }
    }
}

/// TOML file configuration (all fields optional)
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    narrow_threshold: Option<f64>,
    stale_max_age_hours: Option<i64>,
    recent_max_age_hours: Option<i64>,
    low_speed_kph: Option<f64>,
    default_speed_mps: Option<f64>,
    error_display_kph: Option<f64>,
}
