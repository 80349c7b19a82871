//! Error types for the settings crate.
//!
//! This module provides structured error types for configuration loading,
//! saving and validation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a config file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The config file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file (or its directory) could not be written.
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file content is not valid JSON/TOML for a config.
    #[error("Cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The config could not be rendered.
    #[error("Cannot serialize config: {0}")]
    Serialize(String),

    /// The configuration is well formed but holds invalid values.
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub(crate) fn parse(path: &std::path::Path, err: impl ToString) -> Self {
        SettingsError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Errors related to configuration validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is out of valid range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    /// A colour is not a `#RRGGBB` hex string.
    #[error("Invalid colour for '{key}': {value}")]
    InvalidColor { key: String, value: String },

    /// Platform is not supported for config directory resolution.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ValueOutOfRange {
            key: "editor.undo_depth".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.to_string(), "Value out of range for 'editor.undo_depth': 0");
    }

    #[test]
    fn test_settings_error_names_path() {
        let err = SettingsError::parse(std::path::Path::new("/tmp/fk.toml"), "expected `=`");
        assert_eq!(err.to_string(), "Cannot parse /tmp/fk.toml: expected `=`");
    }

    #[test]
    fn test_error_conversion() {
        let err: SettingsError = ConfigError::UnsupportedFormat("yaml".to_string()).into();
        assert!(matches!(err, SettingsError::Config(_)));
    }
}
