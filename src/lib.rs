//! # MaskKit
//!
//! Core of an interactive annotation workstation for segmentation datasets:
//! - Viewport with anchored zoom and image/screen mapping
//! - Pointer gesture state machine (box, lasso, pan, point refinement)
//! - Freehand lasso edits through exact polygon boolean operations
//! - Segmentation oracle predictions with per-object sequencing
//! - Bounded snapshot undo/redo
//!
//! ## Architecture
//!
//! MaskKit is organized as a workspace with multiple crates:
//!
//! 1. **maskkit-core** - Geometry, data model, errors, event bus
//! 2. **maskkit-editor** - Viewport, gestures, lasso, history, session store, orchestrator
//! 3. **maskkit-communication** - Oracle, label store and session provider clients
//! 4. **maskkit-settings** - Configuration file handling
//! 5. **maskkit** - Headless binary that integrates all crates

use std::time::Duration;

pub use maskkit_core::{
    AnnotationObject, AppEvent, BoundingBox, Error, EventBus, ImageInfo, ImageSize, NoticeEvent,
    ObjectId, Point, Result, Ring, Session,
};

pub use maskkit_communication::{
    BackendClient, BackendConfig, HttpLabelStore, HttpSegmentationClient, HttpSessionProvider,
    LabelStore, SegmentationOracle, SessionProvider, SessionRequest, YoloSegLabelStore,
};

pub use maskkit_editor::{
    ApplyOutcome, EditorConfig, PredictionOrchestrator, SessionStore, ViewportLimits, Workstation,
};

pub use maskkit_settings::{Config, LabelBackend, SettingsPersistence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Editor tunables taken from the `editor` section of the config.
pub fn editor_config(config: &Config) -> EditorConfig {
    let editor = &config.editor;
    EditorConfig {
        history_capacity: editor.history_capacity,
        min_box_size: editor.min_box_size,
        viewport: ViewportLimits {
            min_scale: editor.min_scale,
            max_scale: editor.max_scale,
            zoom_step: editor.zoom_step,
            fit_margin: editor.fit_margin,
        }
        .sanitized(),
        default_epsilon: editor.default_simplification_epsilon,
        default_opacity: editor.default_mask_opacity,
    }
}

/// Backend connection parameters taken from the `backend` section.
pub fn backend_config(config: &Config) -> BackendConfig {
    let backend = &config.backend;
    BackendConfig {
        base_url: backend.base_url.trim_end_matches('/').to_string(),
        request_timeout: Duration::from_secs(backend.request_timeout_secs),
        connect_timeout: Duration::from_secs(backend.connect_timeout_secs),
    }
}

/// Session request for the configured dataset.
pub fn session_request(config: &Config) -> SessionRequest {
    let dataset = &config.dataset;
    SessionRequest {
        dataset_path: dataset.path.to_string_lossy().into_owned(),
        classes: dataset.classes.clone(),
        images_subfolder: dataset.images_subfolder.clone(),
        labels_subfolder: dataset.labels_subfolder.clone(),
    }
}
