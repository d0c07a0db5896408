//! Tunable parameters for the geotagging pipeline

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_MAX_GAP_SECONDS;

/// Pipeline configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeotagConfig {
    /// Maximum tolerated time gap for interpolation and boundary clamping
    /// (seconds)
    pub max_gap_seconds: i64,
    /// Name or path of the exiftool binary
    pub exiftool_path: String,
    /// Subdirectory of the photo folder holding GPX logs
    pub gpx_subdir: String,
    /// Subdirectory unmatched photos are moved into
    pub no_match_subdir: String,
}

impl Default for GeotagConfig {
    fn default() -> Self {
        Self {
            max_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
            exiftool_path: "exiftool".to_string(),
            gpx_subdir: "gpx".to_string(),
            no_match_subdir: "no_gps".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    IoError {
        message: String,
    },
    SerializationError {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => write!(f, "I/O error: {}", message),
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl GeotagConfig {
    /// The gap tolerance as a duration for the matching core
    pub fn max_gap(&self) -> Duration {
        Duration::seconds(self.max_gap_seconds)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_gap_seconds <= 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_gap_seconds".to_string(),
                value: self.max_gap_seconds.to_string(),
                reason: "Gap tolerance must be positive".to_string(),
            });
        }
        if self.exiftool_path.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "exiftool_path".to_string(),
                value: String::new(),
                reason: "Exiftool path must not be empty".to_string(),
            });
        }
        if self.gpx_subdir.is_empty() || self.no_match_subdir.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "gpx_subdir/no_match_subdir".to_string(),
                value: String::new(),
                reason: "Subdirectory names must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;
        let config: GeotagConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().into_owned();
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            })?;
        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeotagConfig::default();
        assert_eq!(config.max_gap_seconds, 3600);
        assert_eq!(config.exiftool_path, "exiftool");
        assert_eq!(config.gpx_subdir, "gpx");
        assert_eq!(config.no_match_subdir, "no_gps");
        assert!(config.validate().is_ok());
        assert_eq!(config.max_gap(), Duration::seconds(3600));
    }

    #[test]
    fn test_invalid_gap_rejected() {
        let config = GeotagConfig {
            max_gap_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = GeotagConfig {
            max_gap_seconds: -60,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_tool_path_rejected() {
        let config = GeotagConfig {
            exiftool_path: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join("geotag_config_test.json");
        let config = GeotagConfig {
            max_gap_seconds: 7200,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = GeotagConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = std::env::temp_dir().join("geotag_config_partial_test.json");
        fs::write(&path, r#"{"max_gap_seconds": 600}"#).unwrap();
        let loaded = GeotagConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.max_gap_seconds, 600);
        assert_eq!(loaded.exiftool_path, "exiftool");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = std::env::temp_dir().join("geotag_config_bad_test.json");
        fs::write(&path, "not json").unwrap();
        assert!(GeotagConfig::load_from_file(&path).is_err());
        let _ = fs::remove_file(path);
    }
}
