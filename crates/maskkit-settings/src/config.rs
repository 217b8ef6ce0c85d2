//! Configuration for MaskKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, chosen by file extension.
//!
//! Configuration is organized into logical sections:
//! - Backend connection (base URL, timeouts)
//! - Dataset (location, class list, subfolders)
//! - Editor tunables (history, box size, zoom, defaults)
//! - Label persistence backend

use maskkit_core::constants::{
    DEFAULT_MASK_OPACITY, DEFAULT_SIMPLIFICATION_EPSILON, FIT_MARGIN, HISTORY_CAPACITY,
    MAX_SCALE, MAX_SIMPLIFICATION_EPSILON, MIN_BOX_SIZE, MIN_SCALE, ZOOM_STEP,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the segmentation backend
    pub base_url: String,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

/// Dataset location and class list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Dataset root directory
    pub path: PathBuf,
    /// Ordered class names; the index is the class id
    pub classes: Vec<String>,
    /// Image folder below the dataset root
    pub images_subfolder: String,
    /// Label folder below the dataset root
    pub labels_subfolder: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            classes: Vec::new(),
            images_subfolder: "images".to_string(),
            labels_subfolder: "labels".to_string(),
        }
    }
}

impl DatasetSettings {
    /// Whether a dataset has been configured at all.
    pub fn is_configured(&self) -> bool {
        !self.path.as_os_str().is_empty() && !self.classes.is_empty()
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.path.join(&self.labels_subfolder)
    }
}

/// Editor tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Undo snapshots kept per image
    pub history_capacity: usize,
    /// Boxes must be strictly larger than this on both axes
    pub min_box_size: f64,
    /// Margin subtracted from the container when fitting
    pub fit_margin: f64,
    /// Factor applied per wheel notch
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub default_simplification_epsilon: f64,
    pub default_mask_opacity: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            min_box_size: MIN_BOX_SIZE,
            fit_margin: FIT_MARGIN,
            zoom_step: ZOOM_STEP,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            default_simplification_epsilon: DEFAULT_SIMPLIFICATION_EPSILON,
            default_mask_opacity: DEFAULT_MASK_OPACITY,
        }
    }
}

/// Where labels are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelBackend {
    /// Through the backend's label routes
    #[default]
    Remote,
    /// YOLO-seg text files next to the dataset
    Local,
}

impl std::fmt::Display for LabelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Label persistence settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub backend: LabelBackend,
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendSettings,
    pub dataset: DatasetSettings,
    pub editor: EditorSettings,
    pub labels: LabelSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let format = ConfigFormat::from_path(path)?;
        self.validate()?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let backend = &self.backend;
        if backend.base_url.trim().is_empty() {
            return Err(ConfigError::MissingKey("backend.base_url".to_string()));
        }
        if backend.request_timeout_secs == 0 {
            return Err(ConfigError::out_of_range("backend.request_timeout_secs", 0));
        }
        if backend.connect_timeout_secs == 0 {
            return Err(ConfigError::out_of_range("backend.connect_timeout_secs", 0));
        }

        if self.dataset.classes.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::MissingKey("dataset.classes[]".to_string()));
        }

        let editor = &self.editor;
        if editor.history_capacity == 0 {
            return Err(ConfigError::out_of_range("editor.history_capacity", 0));
        }
        if !editor.min_box_size.is_finite() || editor.min_box_size < 0.0 {
            return Err(ConfigError::out_of_range(
                "editor.min_box_size",
                editor.min_box_size,
            ));
        }
        if !editor.fit_margin.is_finite() || editor.fit_margin < 0.0 {
            return Err(ConfigError::out_of_range("editor.fit_margin", editor.fit_margin));
        }
        if !editor.zoom_step.is_finite() || editor.zoom_step <= 1.0 {
            return Err(ConfigError::out_of_range("editor.zoom_step", editor.zoom_step));
        }
        let scale_range = MIN_SCALE..=MAX_SCALE;
        if !scale_range.contains(&editor.min_scale) {
            return Err(ConfigError::out_of_range("editor.min_scale", editor.min_scale));
        }
        if !scale_range.contains(&editor.max_scale) || editor.max_scale < editor.min_scale {
            return Err(ConfigError::out_of_range("editor.max_scale", editor.max_scale));
        }
        if !(0.0..=MAX_SIMPLIFICATION_EPSILON).contains(&editor.default_simplification_epsilon) {
            return Err(ConfigError::out_of_range(
                "editor.default_simplification_epsilon",
                editor.default_simplification_epsilon,
            ));
        }
        if !(0.0..=1.0).contains(&editor.default_mask_opacity) {
            return Err(ConfigError::out_of_range(
                "editor.default_mask_opacity",
                editor.default_mask_opacity,
            ));
        }

        Ok(())
    }
}
