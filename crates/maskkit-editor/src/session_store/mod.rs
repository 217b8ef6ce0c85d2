//! Authoritative state of the image being annotated.
//!
//! `SessionStore` is an explicit object owned by the application root. It
//! holds the objects of the active image, selection, tool state, viewport,
//! undo history and the loading/saving/unsaved flags. Every object mutation
//! pushes the pre-mutation collection onto the history first.
//!
//! This module is split into submodules:
//! - `objects`: add, update, delete and select objects
//! - `undo`: undo/redo
//! - `tools`: tool, lasso, class and tolerance settings
//! - `effects`: applying gesture effects and lasso edits
//! - `predictions`: issuing and reconciling oracle requests
//! - `persistence`: save and load bookkeeping

mod effects;
mod objects;
mod persistence;
mod predictions;
mod tools;
mod undo;

pub use persistence::{LoadTicket, SaveTicket};

use maskkit_core::constants::{
    clamp_epsilon, clamp_opacity, DEFAULT_MASK_OPACITY, DEFAULT_SIMPLIFICATION_EPSILON,
    HISTORY_CAPACITY, MIN_BOX_SIZE,
};
use maskkit_core::{
    AnnotationObject, AppEvent, EventBus, ImageInfo, ImageSize, LassoMode, ObjectId, Point,
    Session, SessionError, SessionEvent, ToolMode,
};
use std::sync::Arc;

use crate::history::HistoryManager;
use crate::lasso::{CsgLargestRing, PolygonCombiner};
use crate::orchestrator::SequenceTracker;
use crate::viewport::{Viewport, ViewportLimits, ZoomDirection};

/// Editor tunables, usually built from the settings file.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub history_capacity: usize,
    pub min_box_size: f64,
    pub viewport: ViewportLimits,
    pub default_epsilon: f64,
    pub default_opacity: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            min_box_size: MIN_BOX_SIZE,
            viewport: ViewportLimits::default(),
            default_epsilon: DEFAULT_SIMPLIFICATION_EPSILON,
            default_opacity: DEFAULT_MASK_OPACITY,
        }
    }
}

/// State of the session and its active image
pub struct SessionStore {
    pub(crate) config: EditorConfig,
    pub(crate) events: Arc<EventBus>,
    pub(crate) combiner: Arc<dyn PolygonCombiner>,
    pub(crate) session: Option<Session>,
    pub(crate) current_image: Option<ImageInfo>,
    /// Bumped on every image switch; answers for older generations are dropped.
    pub(crate) generation: u64,
    pub(crate) objects: Vec<AnnotationObject>,
    pub(crate) selected: Option<ObjectId>,
    pub(crate) tool_mode: ToolMode,
    pub(crate) lasso_mode: LassoMode,
    pub(crate) current_class: usize,
    pub(crate) viewport: Viewport,
    pub(crate) history: HistoryManager,
    pub(crate) sequences: SequenceTracker,
    pub(crate) pending_predictions: usize,
    pub(crate) saving: bool,
    pub(crate) unsaved: bool,
    /// Bumped on every object mutation.
    pub(crate) revision: u64,
    pub(crate) epsilon: f64,
    pub(crate) opacity: f64,
}

impl SessionStore {
    /// Creates a store with default settings and a private event bus.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default(), Arc::new(EventBus::new()))
    }

    pub fn with_config(config: EditorConfig, events: Arc<EventBus>) -> Self {
        let viewport = Viewport::with_limits(config.viewport);
        Self {
            history: HistoryManager::new(config.history_capacity),
            epsilon: clamp_epsilon(config.default_epsilon),
            opacity: clamp_opacity(config.default_opacity),
            config,
            events,
            combiner: Arc::new(CsgLargestRing),
            session: None,
            current_image: None,
            generation: 0,
            objects: Vec::new(),
            selected: None,
            tool_mode: ToolMode::default(),
            lasso_mode: LassoMode::default(),
            current_class: 0,
            viewport,
            sequences: SequenceTracker::new(),
            pending_predictions: 0,
            saving: false,
            unsaved: false,
            revision: 0,
        }
    }

    /// Replaces the lasso ring-selection policy.
    pub fn with_combiner(mut self, combiner: Arc<dyn PolygonCombiner>) -> Self {
        self.combiner = combiner;
        self
    }

    // =========================================================================
    // READ STATE
    // =========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn classes(&self) -> &[String] {
        self.session
            .as_ref()
            .map(|s| s.classes.as_slice())
            .unwrap_or(&[])
    }

    pub fn current_image(&self) -> Option<&ImageInfo> {
        self.current_image.as_ref()
    }

    pub fn current_image_id(&self) -> Option<&str> {
        self.current_image.as_ref().map(|i| i.id.as_str())
    }

    /// Pixel size of the active image.
    pub fn image_size(&self) -> Option<ImageSize> {
        self.current_image.as_ref().map(ImageInfo::size)
    }

    pub fn objects(&self) -> &[AnnotationObject] {
        &self.objects
    }

    pub fn object(&self, id: &ObjectId) -> Option<&AnnotationObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn selected_id(&self) -> Option<&ObjectId> {
        self.selected.as_ref()
    }

    pub fn selected_object(&self) -> Option<&AnnotationObject> {
        self.selected.as_ref().and_then(|id| self.object(id))
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.tool_mode
    }

    pub fn lasso_mode(&self) -> LassoMode {
        self.lasso_mode
    }

    pub fn current_class(&self) -> usize {
        self.current_class
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn sequences(&self) -> &SequenceTracker {
        &self.sequences
    }

    pub fn pending_predictions(&self) -> usize {
        self.pending_predictions
    }

    /// True while any prediction is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_predictions > 0
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn simplification_epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn mask_opacity(&self) -> f64 {
        self.opacity
    }

    // =========================================================================
    // SESSION AND IMAGE
    // =========================================================================

    /// Installs a new session, replacing the previous one wholesale.
    pub fn set_session(&mut self, session: Session) -> Result<(), SessionError> {
        session.validate()?;
        tracing::info!(
            "Session {} with {} images and {} classes",
            session.session_id,
            session.images.len(),
            session.classes.len()
        );
        let started = SessionEvent::Started {
            session_id: session.session_id.clone(),
            images: session.images.len(),
        };
        self.session = Some(session);
        self.current_image = None;
        self.current_class = 0;
        self.reset_image_state();
        self.publish(AppEvent::Session(started));
        Ok(())
    }

    /// Makes `image_id` the active image and drops all per-image state.
    pub fn switch_image(&mut self, image_id: &str) -> Result<(), SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NoSession)?;
        let image = session
            .image(image_id)
            .cloned()
            .ok_or_else(|| SessionError::ImageNotFound {
                image_id: image_id.to_string(),
            })?;

        tracing::info!("Switching to image {} ({})", image.id, image.filename);
        self.current_image = Some(image);
        self.reset_image_state();
        self.publish(AppEvent::Session(SessionEvent::ImageChanged {
            image_id: image_id.to_string(),
        }));
        Ok(())
    }

    fn reset_image_state(&mut self) {
        self.generation += 1;
        self.objects.clear();
        self.selected = None;
        self.history.clear();
        self.sequences.clear();
        self.pending_predictions = 0;
        self.saving = false;
        self.unsaved = false;
        self.tool_mode = ToolMode::Select;
        self.lasso_mode = LassoMode::Add;
    }

    // =========================================================================
    // VIEWPORT
    // =========================================================================

    /// Fits the active image into a container of the given size.
    pub fn fit_to_container(&mut self, container: ImageSize) {
        if let Some(size) = self.image_size() {
            self.viewport.fit_to_image(size, container);
        }
    }

    pub fn zoom_at(&mut self, pointer: Point, direction: ZoomDirection) {
        self.viewport.zoom_at(pointer, direction);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.viewport.set_scale(scale);
    }

    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.viewport.set_offset(x, y);
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Records the pre-mutation snapshot. Call right before changing `objects`.
    pub(crate) fn checkpoint(&mut self) {
        self.history.push(&self.objects);
        self.revision += 1;
        self.unsaved = true;
    }

    pub(crate) fn publish(&self, event: AppEvent) {
        let _ = self.events.publish(event);
    }

    pub(crate) fn active_image(&self) -> Result<&ImageInfo, SessionError> {
        self.current_image.as_ref().ok_or(SessionError::NoActiveImage)
    }

    pub(crate) fn class_name(&self, class_id: usize) -> String {
        maskkit_core::class_label(self.classes(), class_id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
