//! FieldKit Settings Crate
//!
//! Handles editor configuration: undo depth, hit-testing tolerance, default
//! field styling and label visibility, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{Config, EditorSettings, LabelSettings, StyleSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
