//! Segmentation oracle boundary.
//!
//! The oracle turns a box (plus optional click points), a text prompt or a
//! whole image into polygons. Only its call contract lives here; the
//! [`http`] module speaks it to the annotation backend.

pub mod http;

use async_trait::async_trait;
use maskkit_core::constants::MIN_RING_POINTS;
use maskkit_core::geometry::{pairs, BoundingBox, Point, Ring};
use maskkit_core::OracleError;
use serde::{Deserialize, Serialize};

pub use http::HttpSegmentationClient;

/// Box/points prompt for a single object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub image_id: String,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub points_pos: Vec<Point>,
    #[serde(default)]
    pub points_neg: Vec<Point>,
    pub simplification_epsilon: f64,
    #[serde(default)]
    pub return_mask: bool,
}

/// Polygon produced for one mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonResult {
    #[serde(with = "pairs")]
    pub points: Ring,
    #[serde(default)]
    pub area: f64,
    pub is_valid: bool,
}

impl PolygonResult {
    /// Returns the ring if it can form an object.
    pub fn validated(&self) -> Result<&Ring, OracleError> {
        if !self.is_valid || self.points.len() < MIN_RING_POINTS {
            return Err(OracleError::InvalidPolygon {
                points: self.points.len(),
            });
        }
        if !self.points.iter().all(Point::is_finite) {
            return Err(OracleError::InvalidPolygon {
                points: self.points.len(),
            });
        }
        Ok(&self.points)
    }
}

/// Oracle answer to a [`PredictRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub polygon: PolygonResult,
    #[serde(with = "pairs", default)]
    pub polygon_normalized: Ring,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_base64: Option<String>,
    #[serde(default)]
    pub inference_time_ms: f64,
}

/// Free-text prompt over a whole image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPredictRequest {
    pub image_id: String,
    pub text_prompt: String,
    pub simplification_epsilon: f64,
}

/// One instance found by a text prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrediction {
    #[serde(flatten)]
    pub prediction: PredictResponse,
    #[serde(default)]
    pub instance_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPredictResponse {
    pub results: Vec<TextPrediction>,
    pub count: usize,
}

/// Whole-image automatic annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoAnnotateRequest {
    pub image_id: String,
    pub simplification_epsilon: f64,
}

/// One detection of an auto-annotation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoAnnotation {
    #[serde(with = "pairs")]
    pub polygon: Ring,
    #[serde(with = "pairs", default)]
    pub polygon_normalized: Ring,
    pub score: f64,
    /// Detector-side label of the detection.
    #[serde(default)]
    pub class_id: Option<String>,
    /// Index into the session class list.
    pub class_index: usize,
}

impl AutoAnnotation {
    pub fn is_usable(&self) -> bool {
        self.polygon.len() >= MIN_RING_POINTS && self.polygon.iter().all(Point::is_finite)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoAnnotateResponse {
    pub results: Vec<AutoAnnotation>,
}

/// Model advertised by the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub size: String,
    pub description: String,
    pub is_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsList {
    pub models: Vec<ModelInfo>,
    pub current_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchModelResponse {
    pub success: bool,
    pub model_id: String,
    pub message: String,
}

/// Health of the oracle service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleStatus {
    pub loaded: bool,
    pub device: String,
    pub cache_size: usize,
    pub current_model: String,
}

/// External service that produces polygons from prompts
///
/// Calls are independent and may complete in any order; the prediction
/// orchestrator is responsible for discarding stale answers.
#[async_trait]
pub trait SegmentationOracle: Send + Sync {
    /// Segment one object from a box and optional click points.
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, OracleError>;

    /// Segment every instance matching a text prompt.
    async fn predict_text(
        &self,
        request: TextPredictRequest,
    ) -> Result<TextPredictResponse, OracleError> {
        let _ = request;
        Err(OracleError::Other {
            message: "text prompts are not supported by this oracle".to_string(),
        })
    }

    /// Annotate a whole image.
    async fn auto_annotate(
        &self,
        request: AutoAnnotateRequest,
    ) -> Result<AutoAnnotateResponse, OracleError> {
        let _ = request;
        Err(OracleError::Other {
            message: "auto-annotation is not supported by this oracle".to_string(),
        })
    }
}
