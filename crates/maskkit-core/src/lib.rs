//! # MaskKit Core
//!
//! Core types and utilities shared by every MaskKit crate: the annotation
//! data model, plane geometry, error taxonomy and the event bus.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod model;

pub use error::{Error, GeometryError, LabelError, OracleError, Result, SessionError};

pub use event_bus::{
    AppEvent, EditEvent, EventBus, EventBusConfig, EventCategory, EventFilter, NoticeEvent,
    NoticeSeverity, PersistenceEvent, PredictionEvent, SessionEvent, SubscriptionId,
};

pub use geometry::{BoundingBox, ImageSize, Point, Ring};

pub use model::{
    class_label, AnnotationObject, ImageInfo, LassoMode, ObjectId, Session, ToolMode,
};
