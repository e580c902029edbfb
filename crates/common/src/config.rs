//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KinesyncError, KinesyncResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Optical (MOCA) track defaults.
    pub optical: OpticalDefaults,

    /// Cross-track alignment defaults.
    pub alignment: AlignmentDefaults,

    /// Peak threshold overrides, layered over the built-in table.
    pub peaks: Vec<PeakThresholdEntry>,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default parameters for loading an optical track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticalDefaults {
    /// Case-insensitive substring identifying the tracked marker columns.
    pub marker_label: String,

    /// Shoulder-to-hand length of the subject, in meters.
    pub arm_length_m: f64,

    /// Jump suppression threshold in meters. `None` disables smoothing.
    pub smooth_threshold_m: Option<f64>,

    /// Treat a movement without a calibration formula as an error
    /// instead of falling back to an identity scale.
    pub require_calibration: bool,
}

/// Default parameters for aligning the two tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentDefaults {
    /// Shift the optical vertical series so its first peak matches the
    /// inertial track's first peak. Best effort only.
    pub register_amplitude: bool,

    /// Distance between the wearable's attachment point and the tracked
    /// marker, subtracted during amplitude registration (meters).
    pub sensor_marker_offset_m: f64,

    /// Residual vertical correction for the optical track (meters).
    pub manual_vertical_m: f64,

    /// Residual horizontal correction for the optical track (meters).
    pub manual_horizontal_m: f64,

    /// Residual time shift for the optical track (seconds).
    pub manual_time_shift_s: f64,
}

/// One row of the peak threshold table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakThresholdEntry {
    /// Movement name, e.g. "ChestAA" (case-insensitive).
    pub movement: String,

    /// Speed label, "fast" or "slow" (case-insensitive).
    pub speed: String,

    /// Track kind, "optical" or "inertial".
    pub track: String,

    /// Minimum vertical peak height (meters).
    pub vertical_height: f64,

    /// Minimum horizontal peak height (meters).
    pub horizontal_height: f64,

    /// Minimum distance between accepted peaks (samples).
    pub distance: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "kinesync=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for OpticalDefaults {
    fn default() -> Self {
        Self {
            marker_label: "hand".to_string(),
            arm_length_m: 0.69,
            smooth_threshold_m: Some(0.1),
            require_calibration: false,
        }
    }
}

impl Default for AlignmentDefaults {
    fn default() -> Self {
        Self {
            register_amplitude: false,
            sensor_marker_offset_m: 0.0,
            manual_vertical_m: 0.0,
            manual_horizontal_m: 0.0,
            manual_time_shift_s: 0.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Errors are fatal here since the
    /// caller asked for this file by name.
    pub fn load_from(path: impl AsRef<Path>) -> KinesyncResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KinesyncError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| KinesyncError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> KinesyncResult<()> {
        self.save_to(config_file_path())
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: impl AsRef<Path>) -> KinesyncResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("kinesync").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{ "optical": { "arm_length_m": 0.72 } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.optical.arm_length_m, 0.72);
        assert_eq!(config.optical.marker_label, "hand");
        assert_eq!(config.optical.smooth_threshold_m, Some(0.1));
        assert!(!config.alignment.register_amplitude);
        assert!(config.peaks.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_peak_entries_parse() {
        let raw = r#"{
            "peaks": [
                { "movement": "ChestAA", "speed": "fast", "track": "optical",
                  "vertical_height": 0.7, "horizontal_height": 0.8, "distance": 120 }
            ]
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.peaks.len(), 1);
        assert_eq!(config.peaks[0].distance, 120);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppConfig::load_from("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, KinesyncError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, KinesyncError::Config { .. }));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.alignment.register_amplitude = true;
        config.optical.smooth_threshold_m = None;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(loaded.alignment.register_amplitude);
        assert_eq!(loaded.optical.smooth_threshold_m, None);
    }
}
