//! # MaskKit Editor
//!
//! The interactive editing core of the annotation workstation.
//!
//! ## Features
//!
//! - **Viewport**: scale/pan state and image <-> screen mapping with anchored zoom
//! - **Gestures**: pointer/keyboard state machine producing typed effects
//! - **Lasso**: freehand union/difference edits through exact polygon clipping
//! - **History**: bounded snapshot undo/redo
//! - **Predictions**: oracle calls with per-object sequencing and stale-answer discard
//! - **Session Store**: the single owner of per-image annotation state
//!
//! ## Architecture
//!
//! ```text
//! pointer/keys ─▶ GestureMachine ─▶ Effect ─▶ SessionStore ─▶ PredictionRequest
//!                                                  ▲                  │
//!                                                  └── PredictionOrchestrator ◀─ oracle
//! ```

pub mod gesture;
pub mod history;
pub mod lasso;
pub mod orchestrator;
pub mod session_store;
pub mod viewport;
pub mod workstation;

pub use gesture::{
    Effect, GestureContext, GestureKey, GestureMachine, GestureState, Modifiers, PointerButton,
    PointerEvent,
};
pub use history::{HistoryEntry, HistoryManager};
pub use lasso::{apply_lasso, CsgLargestRing, PolygonCombiner};
pub use orchestrator::{
    ApplyOutcome, BatchItem, PredictionOrchestrator, PredictionRequest, PredictionTicket,
    SequenceTracker, SharedStore,
};
pub use session_store::{EditorConfig, LoadTicket, SaveTicket, SessionStore};
pub use viewport::{Viewport, ViewportLimits, ZoomDirection};
pub use workstation::{PredictionTask, Workstation};
