//! Event type definitions for the event bus.
//!
//! This module defines all application events organized by category.
//! Events are cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

use crate::model::{LassoMode, ToolMode};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Session setup and image switching
    Session(SessionEvent),
    /// Object collection edits
    Edit(EditEvent),
    /// Segmentation request lifecycle
    Prediction(PredictionEvent),
    /// Label save/load lifecycle
    Persistence(PersistenceEvent),
    /// User-visible notices
    Notice(NoticeEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Session(_) => EventCategory::Session,
            AppEvent::Edit(_) => EventCategory::Edit,
            AppEvent::Prediction(_) => EventCategory::Prediction,
            AppEvent::Persistence(_) => EventCategory::Persistence,
            AppEvent::Notice(_) => EventCategory::Notice,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Session(e) => e.description(),
            AppEvent::Edit(e) => e.description(),
            AppEvent::Prediction(e) => e.description(),
            AppEvent::Persistence(e) => e.description(),
            AppEvent::Notice(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Session setup and image switching events.
    Session,
    /// Object edit events.
    Edit,
    /// Prediction events.
    Prediction,
    /// Label persistence events.
    Persistence,
    /// User-visible notices.
    Notice,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Session => write!(f, "Session"),
            EventCategory::Edit => write!(f, "Edit"),
            EventCategory::Prediction => write!(f, "Prediction"),
            EventCategory::Persistence => write!(f, "Persistence"),
            EventCategory::Notice => write!(f, "Notice"),
        }
    }
}

/// Session-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A session was set up.
    Started {
        /// Session identifier.
        session_id: String,
        /// Number of images in the session.
        images: usize,
    },
    /// The active image changed.
    ImageChanged {
        /// Newly active image.
        image_id: String,
    },
    /// Tool or lasso mode changed.
    ToolChanged {
        /// New tool mode.
        tool: ToolMode,
        /// New lasso mode.
        lasso: LassoMode,
    },
}

impl SessionEvent {
    fn description(&self) -> String {
        match self {
            SessionEvent::Started { session_id, images } => {
                format!("Session {} started ({} images)", session_id, images)
            }
            SessionEvent::ImageChanged { image_id } => format!("Image: {}", image_id),
            SessionEvent::ToolChanged { tool, lasso } => format!("Tool: {} ({})", tool, lasso),
        }
    }
}

/// Object edit events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditEvent {
    /// Objects were added.
    Added {
        /// Ids of the new objects.
        ids: Vec<String>,
    },
    /// An object was updated.
    Updated {
        /// Id of the updated object.
        id: String,
    },
    /// An object was deleted.
    Deleted {
        /// Id of the deleted object.
        id: String,
    },
    /// Selection changed.
    SelectionChanged {
        /// Newly selected object, if any.
        id: Option<String>,
    },
    /// Objects were restored from history.
    Restored {
        /// Whether the restore was an undo (false means redo).
        undo: bool,
        /// Number of objects after the restore.
        count: usize,
    },
}

impl EditEvent {
    fn description(&self) -> String {
        match self {
            EditEvent::Added { ids } => format!("Added {} objects", ids.len()),
            EditEvent::Updated { id } => format!("Updated {}", id),
            EditEvent::Deleted { id } => format!("Deleted {}", id),
            EditEvent::SelectionChanged { id } => match id {
                Some(id) => format!("Selected {}", id),
                None => "Selection cleared".to_string(),
            },
            EditEvent::Restored { undo, count } => {
                let kind = if *undo { "Undo" } else { "Redo" };
                format!("{}: {} objects", kind, count)
            }
        }
    }
}

/// Prediction request lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredictionEvent {
    /// A request was sent to the oracle.
    Requested {
        /// Image the request targets.
        image_id: String,
        /// Object being refined, `None` for new objects.
        object_id: Option<String>,
        /// Per-object sequence number, `None` for new objects.
        sequence: Option<u64>,
    },
    /// A response was applied to the object collection.
    Applied {
        /// Image the response targets.
        image_id: String,
        /// Number of objects created or updated.
        objects: usize,
    },
    /// A response was dropped because a newer request exists or the image changed.
    Discarded {
        /// Image the response targets.
        image_id: String,
        /// Why the response was dropped.
        reason: String,
    },
}

impl PredictionEvent {
    fn description(&self) -> String {
        match self {
            PredictionEvent::Requested {
                image_id,
                object_id,
                sequence,
            } => match (object_id, sequence) {
                (Some(id), Some(seq)) => format!("Predict {} #{} on {}", id, seq, image_id),
                _ => format!("Predict new object on {}", image_id),
            },
            PredictionEvent::Applied { image_id, objects } => {
                format!("Applied {} objects on {}", objects, image_id)
            }
            PredictionEvent::Discarded { image_id, reason } => {
                format!("Discarded response for {}: {}", image_id, reason)
            }
        }
    }
}

/// Label persistence events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    /// Labels were saved.
    Saved {
        /// Image whose labels were written.
        image_id: String,
        /// Destination reported by the label store.
        filepath: String,
        /// Number of objects written.
        objects: usize,
    },
    /// Labels were loaded.
    Loaded {
        /// Image whose labels were read.
        image_id: String,
        /// Whether a label file existed.
        exists: bool,
        /// Number of objects read.
        objects: usize,
    },
}

impl PersistenceEvent {
    fn description(&self) -> String {
        match self {
            PersistenceEvent::Saved {
                image_id, objects, ..
            } => format!("Saved {} objects for {}", objects, image_id),
            PersistenceEvent::Loaded {
                image_id,
                exists,
                objects,
            } => {
                if *exists {
                    format!("Loaded {} objects for {}", objects, image_id)
                } else {
                    format!("No labels for {}", image_id)
                }
            }
        }
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeSeverity {
    /// Informational.
    Info,
    /// Operation failed, session still usable.
    Warning,
    /// Operation failed and needs attention.
    Error,
}

/// Messages meant to be shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoticeEvent {
    /// The segmentation oracle failed.
    OracleFailure {
        /// Human-readable failure message.
        message: String,
    },
    /// A lasso edit could not be applied.
    GeometryFailure {
        /// Object that was being edited.
        object_id: String,
        /// Human-readable failure message.
        message: String,
    },
    /// Saving or loading labels failed.
    PersistenceFailure {
        /// Human-readable failure message.
        message: String,
    },
    /// Informational message.
    Info {
        /// Message text.
        message: String,
    },
}

impl NoticeEvent {
    fn description(&self) -> String {
        match self {
            NoticeEvent::OracleFailure { message } => format!("Segmentation failed: {}", message),
            NoticeEvent::GeometryFailure { object_id, message } => {
                format!("Lasso edit on {} failed: {}", object_id, message)
            }
            NoticeEvent::PersistenceFailure { message } => format!("Labels: {}", message),
            NoticeEvent::Info { message } => message.clone(),
        }
    }

    /// Get the severity of this notice
    pub fn severity(&self) -> NoticeSeverity {
        match self {
            NoticeEvent::Info { .. } => NoticeSeverity::Info,
            NoticeEvent::GeometryFailure { .. } => NoticeSeverity::Warning,
            NoticeEvent::OracleFailure { .. } | NoticeEvent::PersistenceFailure { .. } => {
                NoticeSeverity::Error
            }
        }
    }
}
