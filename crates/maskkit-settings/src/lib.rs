//! MaskKit Settings Crate
//!
//! Handles application configuration and settings persistence.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    BackendSettings, Config, ConfigFormat, DatasetSettings, EditorSettings, LabelBackend,
    LabelSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;
