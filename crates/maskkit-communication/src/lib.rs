//! # MaskKit Communication
//!
//! Clients for the external collaborators of the annotation core:
//! the segmentation oracle, label persistence and session provisioning.
//! Each collaborator is an async trait with an HTTP implementation for the
//! annotation backend; labels can also live in local YOLO-seg files.

pub mod client;
pub mod labels;
pub mod oracle;
pub mod session;

pub use client::{BackendClient, BackendConfig, TransportError};

pub use labels::{HttpLabelStore, LabelStore, LoadOutcome, SaveOutcome, YoloSegLabelStore};

pub use oracle::{
    AutoAnnotateRequest, AutoAnnotateResponse, AutoAnnotation, HttpSegmentationClient, ModelInfo,
    ModelsList, OracleStatus, PolygonResult, PredictRequest, PredictResponse, SegmentationOracle,
    SwitchModelResponse, TextPredictRequest, TextPredictResponse, TextPrediction,
};

pub use session::{HttpSessionProvider, SessionProvider, SessionRequest};
