//! Configuration and settings management for FieldKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into logical sections:
//! - Editor behaviour (undo depth, hit tolerance, naming)
//! - Default field style (stroke, fill, selection highlight)
//! - Label visibility

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// File name used inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Editor behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Maximum number of undo entries kept per session
    pub undo_depth: usize,
    /// Pointer distance in pixels within which a marker is hit
    pub hit_tolerance_px: f64,
    /// Prefix for automatically generated field names ("Field 1", ...)
    pub field_name_prefix: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            undo_depth: 100,
            hit_tolerance_px: 12.0,
            field_name_prefix: "Field".to_string(),
        }
    }
}

/// Default styling for new fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    /// Outline colour (`#RRGGBB`)
    pub stroke_color: String,
    /// Fill colour (`#RRGGBB`)
    pub fill_color: String,
    /// Outline width in pixels
    pub stroke_weight: f64,
    /// Fill opacity in `0.0..=1.0`
    pub fill_opacity: f64,
    /// Outline colour used while a field is selected
    pub selected_stroke_color: String,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            stroke_color: "#FF0000".to_string(),
            fill_color: "#FF0000".to_string(),
            stroke_weight: 2.0,
            fill_opacity: 0.35,
            selected_stroke_color: "#FFFF00".to_string(),
        }
    }
}

/// Label visibility settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Show a length label over every edge
    pub show_edge_labels: bool,
    /// Show the name and area label at each field centroid
    pub show_field_labels: bool,
    /// Show the live area/perimeter banner while drawing
    pub show_live_banner: bool,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            show_edge_labels: true,
            show_field_labels: true,
            show_live_banner: true,
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Editor behaviour
    pub editor: EditorSettings,
    /// Default field style
    pub style: StyleSettings,
    /// Label visibility
    pub labels: LabelSettings,
}

impl Config {
    /// Platform configuration directory for FieldKit
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("fieldkit"))
            .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    /// Default config file path inside [`Config::config_dir`]
    pub fn default_path() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load config from file (JSON or TOML, chosen by extension)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match format {
            Format::Json => {
                serde_json::from_str(&content).map_err(|e| SettingsError::parse(path, e))?
            }
            Format::Toml => toml::from_str(&content).map_err(|e| SettingsError::parse(path, e))?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| SettingsError::Serialize(e.to_string()))?,
            Format::Toml => self.to_toml_string()?,
        };

        let write_error = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.editor.undo_depth == 0 {
            return Err(out_of_range("editor.undo_depth", self.editor.undo_depth));
        }

        if !(self.editor.hit_tolerance_px.is_finite() && self.editor.hit_tolerance_px > 0.0) {
            return Err(out_of_range(
                "editor.hit_tolerance_px",
                self.editor.hit_tolerance_px,
            ));
        }

        if !(self.style.stroke_weight.is_finite() && self.style.stroke_weight > 0.0) {
            return Err(out_of_range("style.stroke_weight", self.style.stroke_weight));
        }

        if !(0.0..=1.0).contains(&self.style.fill_opacity) {
            return Err(out_of_range("style.fill_opacity", self.style.fill_opacity));
        }

        for (key, value) in [
            ("style.stroke_color", &self.style.stroke_color),
            ("style.fill_color", &self.style.fill_color),
            ("style.selected_stroke_color", &self.style.selected_stroke_color),
        ] {
            if !is_hex_color(value) {
                return Err(ConfigError::InvalidColor {
                    key: key.to_string(),
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
