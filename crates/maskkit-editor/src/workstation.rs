//! Application root of the editing core.
//!
//! Owns the shared session store, the gesture machine, the prediction
//! orchestrator and the label store. Input events go through the gesture
//! machine; effects are applied to the store and any resulting prediction is
//! spawned on the tokio runtime the workstation was bound to.

use maskkit_communication::{LabelStore, SaveOutcome, SegmentationOracle};
use maskkit_core::{Error, EventBus, ImageSize, Point, Session};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::gesture::{Effect, GestureKey, GestureMachine, PointerEvent};
use crate::orchestrator::{ApplyOutcome, PredictionOrchestrator, PredictionRequest, SharedStore};
use crate::session_store::{EditorConfig, SessionStore};
use crate::viewport::ZoomDirection;

/// Handle of a prediction running in the background.
pub type PredictionTask = JoinHandle<Result<ApplyOutcome, Error>>;

/// Editing workstation wiring input, state and collaborators together
pub struct Workstation {
    store: SharedStore,
    gestures: GestureMachine,
    orchestrator: PredictionOrchestrator,
    labels: Arc<dyn LabelStore>,
    events: Arc<EventBus>,
    runtime: Handle,
}

impl Workstation {
    /// Creates a workstation bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Use [`Workstation::with_runtime`]
    /// to bind an explicit runtime instead.
    pub fn new(
        config: EditorConfig,
        oracle: Arc<dyn SegmentationOracle>,
        labels: Arc<dyn LabelStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self::with_runtime(Handle::current(), config, oracle, labels, events)
    }

    /// Creates a workstation whose background predictions run on `runtime`.
    ///
    /// The input methods may then be called from threads outside the runtime.
    pub fn with_runtime(
        runtime: Handle,
        config: EditorConfig,
        oracle: Arc<dyn SegmentationOracle>,
        labels: Arc<dyn LabelStore>,
        events: Arc<EventBus>,
    ) -> Self {
        let gestures = GestureMachine::with_min_box_size(config.min_box_size);
        let store = SessionStore::with_config(config, events.clone());
        Self {
            store: Arc::new(RwLock::new(store)),
            gestures,
            orchestrator: PredictionOrchestrator::new(oracle),
            labels,
            events,
            runtime,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn gestures(&self) -> &GestureMachine {
        &self.gestures
    }

    pub fn orchestrator(&self) -> &PredictionOrchestrator {
        &self.orchestrator
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    pub fn pointer_down(&mut self, event: PointerEvent) -> Option<PredictionTask> {
        let effect = {
            let store = self.store.read();
            self.gestures.on_pointer_down(event, &store.gesture_context())
        };
        self.route(effect)
    }

    pub fn pointer_move(&mut self, position: Point) -> Option<PredictionTask> {
        let effect = {
            let store = self.store.read();
            self.gestures.on_pointer_move(position, &store.gesture_context())
        };
        self.route(effect)
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> Option<PredictionTask> {
        let effect = {
            let store = self.store.read();
            self.gestures.on_pointer_up(event, &store.gesture_context())
        };
        self.route(effect)
    }

    pub fn key_down(&mut self, key: GestureKey) {
        self.gestures.on_key_down(key);
    }

    pub fn key_up(&mut self, key: GestureKey) {
        self.gestures.on_key_up(key);
    }

    /// Zooms one notch around the pointer.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) {
        self.store
            .write()
            .zoom_at(pointer, ZoomDirection::from_wheel_delta(delta_y));
    }

    fn route(&self, effect: Effect) -> Option<PredictionTask> {
        if effect == Effect::None {
            return None;
        }
        let request = self.store.write().apply_effect(effect)?;
        Some(self.spawn(request))
    }

    /// Runs a prediction in the background on the bound runtime.
    pub fn spawn(&self, request: PredictionRequest) -> PredictionTask {
        let orchestrator = self.orchestrator.clone();
        let store = self.store.clone();
        self.runtime.spawn(async move { orchestrator.dispatch(&store, request).await })
    }

    // =========================================================================
    // SESSION, IMAGES AND LABELS
    // =========================================================================

    pub fn set_session(&mut self, session: Session) -> Result<(), Error> {
        self.gestures.cancel();
        self.store.write().set_session(session)?;
        Ok(())
    }

    /// Activates an image, fits it into `container` and loads its labels.
    pub async fn switch_image(
        &mut self,
        image_id: &str,
        container: ImageSize,
    ) -> Result<bool, Error> {
        self.gestures.cancel();
        {
            let mut store = self.store.write();
            store.switch_image(image_id)?;
            store.fit_to_container(container);
        }
        self.reload_labels().await
    }

    /// Replaces the objects of the active image with its stored labels.
    pub async fn reload_labels(&self) -> Result<bool, Error> {
        let ticket = self.store.read().begin_load()?;
        let result = self.labels.load(&ticket.image, &ticket.classes).await;
        Ok(self.store.write().finish_load(&ticket, result))
    }

    /// Saves the active image's objects.
    pub async fn save(&self) -> Result<SaveOutcome, Error> {
        let ticket = self.store.write().begin_save()?;
        let result = self.labels.save(&ticket.image, &ticket.objects).await;
        self.store.write().finish_save(&ticket, &result);
        result.map_err(Error::from)
    }

    /// Runs a text prompt on the active image for the current class.
    pub async fn text_prompt(&self, prompt: &str) -> Result<ApplyOutcome, Error> {
        let (image_id, class_index, epsilon) = {
            let store = self.store.read();
            let image_id = store
                .current_image_id()
                .map(str::to_string)
                .ok_or(maskkit_core::SessionError::NoActiveImage)?;
            (image_id, store.current_class(), store.simplification_epsilon())
        };
        self.orchestrator
            .request_text_prompt(&self.store, &image_id, prompt, class_index, epsilon)
            .await
    }

    /// Auto-annotates the active image.
    pub async fn auto_annotate(&self) -> Result<ApplyOutcome, Error> {
        let (image_id, epsilon) = {
            let store = self.store.read();
            let image_id = store
                .current_image_id()
                .map(str::to_string)
                .ok_or(maskkit_core::SessionError::NoActiveImage)?;
            (image_id, store.simplification_epsilon())
        };
        self.orchestrator
            .request_auto_annotation(&self.store, &image_id, epsilon)
            .await
    }

    pub fn undo(&self) -> bool {
        self.store.write().undo()
    }

    pub fn redo(&self) -> bool {
        self.store.write().redo()
    }
}
