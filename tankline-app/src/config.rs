//! Configuration for the tank monitor.
//!
//! Loaded once at startup from a JSON file. Every field has a default, so an
//! empty object `{}` describes the stock setup: a 0–1000 mm tank read every
//! two seconds, averaged over ten samples and published as a percentage on
//! `tanks.fuel.currentLevel`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tankline_connectors::{config_path, validate_path, DEFAULT_CONTEXT};
use tankline_core::constants::buffers::{MAX_PATH_LEN, MAX_WINDOW};
use tankline_core::constants::time::{DEFAULT_READ_INTERVAL_MS, DEFAULT_UPTIME_INTERVAL_MS};
use tankline_core::LinearCalibration;
use thiserror::Error;

use crate::tank::{LINEAR_LEAF, SAMPLES_LEAF};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Device settings.
    pub device: DeviceConfig,

    /// Tank level chain.
    pub level: LevelConfig,

    /// Sensor status chain.
    pub status: StatusConfig,

    /// Uptime reporting.
    pub uptime: UptimeConfig,

    /// Simulated sensor used when no hardware driver is attached.
    pub simulation: SimulationConfig,
}

/// Device identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hostname used as the Signal K source label.
    /// Use "auto" to detect automatically (default).
    pub hostname: String,

    /// Signal K context the values belong to.
    pub context: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            hostname: "auto".to_string(),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }
}

/// Tank level chain: sensor → linear → moving average → Signal K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Signal K path of the calibrated level.
    pub path: String,

    /// Read interval in milliseconds (default: 2000).
    pub interval_ms: u32,

    /// Empty/full reference readings and target range.
    pub calibration: LinearCalibration,

    /// Moving average window (default: 10).
    pub samples: usize,

    /// Moving average output scale (default: 1.0).
    pub scale: f32,

    /// Raw reading emitted when the sensor fails (default: -1.0).
    pub failure_value: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            path: "tanks.fuel.currentLevel".to_string(),
            interval_ms: DEFAULT_READ_INTERVAL_MS,
            calibration: LinearCalibration::percent(0.0, 1000.0),
            samples: 10,
            scale: 1.0,
            failure_value: -1.0,
        }
    }
}

/// Sensor status chain: status code → `code == 1` → Signal K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Publish the status flag (default: true).
    pub enabled: bool,

    /// Signal K path of the status flag.
    pub path: String,

    /// Read interval in milliseconds (default: 2000).
    pub interval_ms: u32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "tanks.fuel.sensorStatus".to_string(),
            interval_ms: DEFAULT_READ_INTERVAL_MS,
        }
    }
}

/// Seconds since start on `sensorDevice.<hostname>.uptime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeConfig {
    /// Publish uptime (default: true).
    pub enabled: bool,

    /// Report interval in milliseconds (default: 60000).
    pub interval_ms: u32,
}

impl Default for UptimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_UPTIME_INTERVAL_MS,
        }
    }
}

/// Behaviour of the simulated DS1603L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Liquid height in mm.
    pub level_mm: f32,

    /// Peak deviation added by sloshing, in mm.
    pub ripple_mm: f32,

    /// Every n-th read fails with no echo (0 = never).
    pub dropout_every: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            level_mm: 500.0,
            ripple_mm: 5.0,
            dropout_every: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a file path.
    ///
    /// Calls [`validate`](Self::validate) after loading.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level
            .calibration
            .derive()
            .map_err(|e| ConfigError::validation(format!("level.calibration: {e}")))?;

        if self.level.samples == 0 || self.level.samples > MAX_WINDOW {
            return Err(ConfigError::validation(format!(
                "level.samples must be between 1 and {MAX_WINDOW}"
            )));
        }
        if !self.level.scale.is_finite() {
            return Err(ConfigError::validation("level.scale must be finite"));
        }

        check_interval("level.interval_ms", self.level.interval_ms)?;
        check_signalk_path("level.path", &self.level.path)?;
        for leaf in [LINEAR_LEAF, SAMPLES_LEAF] {
            check_length("level.path", &config_path(&self.level.path, leaf))?;
        }

        if self.status.enabled {
            check_interval("status.interval_ms", self.status.interval_ms)?;
            check_signalk_path("status.path", &self.status.path)?;
            if self.status.path == self.level.path {
                return Err(ConfigError::validation("status.path must differ from level.path"));
            }
        }

        if self.uptime.enabled {
            check_interval("uptime.interval_ms", self.uptime.interval_ms)?;
        }

        if self.device.hostname.is_empty() {
            return Err(ConfigError::validation("device.hostname must not be empty"));
        }

        Ok(())
    }

    /// Resolve the hostname, detecting it when set to "auto".
    pub fn get_hostname(&self) -> String {
        if self.device.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "tankline".to_string())
        } else {
            self.device.hostname.clone()
        }
    }
}

fn check_interval(name: &str, interval_ms: u32) -> Result<(), ConfigError> {
    if interval_ms == 0 {
        return Err(ConfigError::validation(format!("{name} must be at least 1")));
    }
    Ok(())
}

fn check_signalk_path(name: &str, path: &str) -> Result<(), ConfigError> {
    validate_path(path).map_err(|e| ConfigError::validation(format!("{name}: {e}")))?;
    check_length(name, path)
}

/// Sink paths and the transform paths derived from them share one limit
fn check_length(name: &str, path: &str) -> Result<(), ConfigError> {
    if path.len() > MAX_PATH_LEN {
        return Err(ConfigError::validation(format!(
            "{name}: {path:?} is longer than {MAX_PATH_LEN} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = AppConfig::from_json("{}").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.level.interval_ms, 2000);
        assert_eq!(config.level.samples, 10);
        assert_eq!(config.level.calibration.full_value, 1000.0);
        assert_eq!(config.level.path, "tanks.fuel.currentLevel");
        assert!(config.uptime.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "device": { "hostname": "tank-sensor" },
                "level": { "calibration": { "empty_value": 200.0, "full_value": 1400.0 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.get_hostname(), "tank-sensor");
        assert_eq!(config.level.calibration.empty_value, 200.0);
        assert_eq!(config.level.calibration.target_max, 100.0);
        assert_eq!(config.level.samples, 10);
    }

    #[test]
    fn rejects_degenerate_calibration() {
        let err = AppConfig::from_json(
            r#"{ "level": { "calibration": { "empty_value": 500.0, "full_value": 500.0 } } }"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("calibration")));
    }

    #[test]
    fn rejects_bad_window_and_intervals() {
        let mut config = AppConfig::default();
        config.level.samples = MAX_WINDOW + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.status.interval_ms = 0;
        assert!(config.validate().is_err());

        // Disabled sections are not checked
        config.status.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_invalid_paths() {
        let mut config = AppConfig::default();
        config.status.path = "/tanks_fuel_currentLevel/sensor_status".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.status.path = config.level.path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn level_path_leaves_room_for_transform_paths() {
        // "/" + path + "/samples" adds 9 bytes
        let mut config = AppConfig::default();
        config.level.path = format!("tanks.fuel.{}", "a".repeat(MAX_PATH_LEN - 11 - 9));
        assert_eq!(config.level.path.len(), MAX_PATH_LEN - 9);
        assert!(config.validate().is_ok());

        config.level.path.push('b');
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("level.path")));
    }

    #[test]
    fn parse_errors_are_reported() {
        assert!(matches!(AppConfig::from_json("{ level: }"), Err(ConfigError::Parse(_))));
    }
}
