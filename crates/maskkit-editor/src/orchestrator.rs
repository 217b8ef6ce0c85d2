//! Prediction orchestration.
//!
//! Turns box, point, text and whole-image prompts into oracle calls and
//! reconciles the answers into the session store. A call is split in three
//! steps so no lock is held while the oracle works:
//!
//! 1. `begin_prediction` validates the request under the write lock and
//!    issues a [`PredictionTicket`] (image generation + per-object sequence).
//! 2. The oracle is awaited with the lock released.
//! 3. The answer is applied under the write lock, or discarded when the
//!    image changed or a newer request for the same object was issued.

use maskkit_communication::{
    AutoAnnotateRequest, PredictRequest, PredictResponse, SegmentationOracle, TextPredictRequest,
};
use maskkit_core::{BoundingBox, Error, ObjectId, OracleError, Point, Ring};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::session_store::SessionStore;

/// Store shared between the workstation and in-flight predictions.
pub type SharedStore = Arc<RwLock<SessionStore>>;

/// What to ask the oracle for.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionRequest {
    /// Segment a new object inside `bbox`.
    Box { image_id: String, bbox: BoundingBox },
    /// Re-segment an existing object with its full click history.
    Points {
        image_id: String,
        object_id: ObjectId,
        bbox: BoundingBox,
        positives: Vec<Point>,
        negatives: Vec<Point>,
    },
    /// One object per instance matching `prompt`, all of class `class_index`.
    Text {
        image_id: String,
        prompt: String,
        class_index: usize,
    },
    /// Annotate the whole image.
    Auto { image_id: String },
}

impl PredictionRequest {
    pub fn image_id(&self) -> &str {
        match self {
            Self::Box { image_id, .. }
            | Self::Points { image_id, .. }
            | Self::Text { image_id, .. }
            | Self::Auto { image_id } => image_id,
        }
    }

    /// Targeted object of a refinement.
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Points { object_id, .. } => Some(object_id),
            _ => None,
        }
    }
}

/// A request accepted by the store, awaiting its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTicket {
    pub request: PredictionRequest,
    /// Image generation the request was issued against.
    pub generation: u64,
    /// Per-object sequence number of a refinement.
    pub sequence: Option<u64>,
    /// Clamped simplification tolerance.
    pub epsilon: f64,
}

impl PredictionTicket {
    /// Oracle payload for box and point requests.
    pub fn predict_request(&self) -> Option<PredictRequest> {
        match &self.request {
            PredictionRequest::Box { image_id, bbox } => Some(PredictRequest {
                image_id: image_id.clone(),
                bbox: *bbox,
                points_pos: Vec::new(),
                points_neg: Vec::new(),
                simplification_epsilon: self.epsilon,
                return_mask: false,
            }),
            PredictionRequest::Points {
                image_id,
                bbox,
                positives,
                negatives,
                ..
            } => Some(PredictRequest {
                image_id: image_id.clone(),
                bbox: *bbox,
                points_pos: positives.clone(),
                points_neg: negatives.clone(),
                simplification_epsilon: self.epsilon,
                return_mask: false,
            }),
            PredictionRequest::Text { .. } | PredictionRequest::Auto { .. } => None,
        }
    }
}

/// How an oracle answer was reconciled.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Objects were created or updated.
    Applied { ids: Vec<ObjectId> },
    /// A newer request for the same object exists, or the object is gone.
    StaleDiscarded,
    /// The answer belongs to an image that is no longer active.
    ImageChanged,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// One polygon of a text or auto-annotation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub polygon: Ring,
    pub score: f64,
    pub class_index: usize,
}

/// Monotonic per-object request counters.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    latest: HashMap<ObjectId, u64>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next sequence number for `id`, starting at 1.
    pub fn next(&mut self, id: &ObjectId) -> u64 {
        let seq = self.latest.entry(id.clone()).or_insert(0);
        *seq += 1;
        *seq
    }

    /// True when `sequence` is the newest one issued for `id`.
    pub fn is_current(&self, id: &ObjectId, sequence: u64) -> bool {
        self.latest.get(id) == Some(&sequence)
    }

    pub fn latest(&self, id: &ObjectId) -> Option<u64> {
        self.latest.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }
}

/// Drives oracle calls against a shared store.
#[derive(Clone)]
pub struct PredictionOrchestrator {
    oracle: Arc<dyn SegmentationOracle>,
}

impl PredictionOrchestrator {
    pub fn new(oracle: Arc<dyn SegmentationOracle>) -> Self {
        Self { oracle }
    }

    /// Requests a new object for `bbox`.
    pub async fn request_mask_for_box(
        &self,
        store: &SharedStore,
        image_id: &str,
        bbox: BoundingBox,
        epsilon: f64,
    ) -> Result<ApplyOutcome, Error> {
        let request = PredictionRequest::Box {
            image_id: image_id.to_string(),
            bbox,
        };
        self.run_single(store, request, epsilon).await
    }

    /// Re-segments `object_id` from its box and click points.
    #[allow(clippy::too_many_arguments)]
    pub async fn request_mask_for_points(
        &self,
        store: &SharedStore,
        image_id: &str,
        object_id: &ObjectId,
        bbox: BoundingBox,
        positives: Vec<Point>,
        negatives: Vec<Point>,
        epsilon: f64,
    ) -> Result<ApplyOutcome, Error> {
        let request = PredictionRequest::Points {
            image_id: image_id.to_string(),
            object_id: object_id.clone(),
            bbox,
            positives,
            negatives,
        };
        self.run_single(store, request, epsilon).await
    }

    /// Creates one object of class `class_index` per instance matching `prompt`.
    pub async fn request_text_prompt(
        &self,
        store: &SharedStore,
        image_id: &str,
        prompt: &str,
        class_index: usize,
        epsilon: f64,
    ) -> Result<ApplyOutcome, Error> {
        let request = PredictionRequest::Text {
            image_id: image_id.to_string(),
            prompt: prompt.to_string(),
            class_index,
        };
        let ticket = store.write().begin_prediction(request, epsilon)?;

        let answer = self
            .oracle
            .predict_text(TextPredictRequest {
                image_id: image_id.to_string(),
                text_prompt: prompt.to_string(),
                simplification_epsilon: ticket.epsilon,
            })
            .await;

        match answer {
            Ok(response) => {
                let items = response
                    .results
                    .into_iter()
                    .filter_map(|r| match r.prediction.polygon.validated() {
                        Ok(ring) => Some(BatchItem {
                            polygon: ring.clone(),
                            score: r.prediction.score,
                            class_index,
                        }),
                        Err(e) => {
                            tracing::debug!("Skipping instance {}: {}", r.instance_id, e);
                            None
                        }
                    })
                    .collect();
                Ok(store.write().complete_batch(&ticket, items))
            }
            Err(err) => Err(self.fail(store, &ticket, err)),
        }
    }

    /// Annotates the whole image in one batch.
    pub async fn request_auto_annotation(
        &self,
        store: &SharedStore,
        image_id: &str,
        epsilon: f64,
    ) -> Result<ApplyOutcome, Error> {
        let request = PredictionRequest::Auto {
            image_id: image_id.to_string(),
        };
        let ticket = store.write().begin_prediction(request, epsilon)?;

        let answer = self
            .oracle
            .auto_annotate(AutoAnnotateRequest {
                image_id: image_id.to_string(),
                simplification_epsilon: ticket.epsilon,
            })
            .await;

        match answer {
            Ok(response) => {
                let items = response
                    .results
                    .into_iter()
                    .filter(|a| a.is_usable())
                    .map(|a| BatchItem {
                        polygon: a.polygon,
                        score: a.score,
                        class_index: a.class_index,
                    })
                    .collect();
                Ok(store.write().complete_batch(&ticket, items))
            }
            Err(err) => Err(self.fail(store, &ticket, err)),
        }
    }

    /// Runs a request produced by the session store, using its tolerance.
    pub async fn dispatch(
        &self,
        store: &SharedStore,
        request: PredictionRequest,
    ) -> Result<ApplyOutcome, Error> {
        let epsilon = store.read().simplification_epsilon();
        match request {
            PredictionRequest::Text {
                image_id,
                prompt,
                class_index,
            } => {
                self.request_text_prompt(store, &image_id, &prompt, class_index, epsilon)
                    .await
            }
            PredictionRequest::Auto { image_id } => {
                self.request_auto_annotation(store, &image_id, epsilon)
                    .await
            }
            single => self.run_single(store, single, epsilon).await,
        }
    }

    async fn run_single(
        &self,
        store: &SharedStore,
        request: PredictionRequest,
        epsilon: f64,
    ) -> Result<ApplyOutcome, Error> {
        let ticket = store.write().begin_prediction(request, epsilon)?;
        let Some(payload) = ticket.predict_request() else {
            return Err(Error::other("not a single-object request"));
        };

        let answer = self
            .oracle
            .predict(payload)
            .await
            .and_then(checked);

        match answer {
            Ok(response) => Ok(store.write().complete_prediction(&ticket, &response)),
            Err(err) => Err(self.fail(store, &ticket, err)),
        }
    }

    fn fail(&self, store: &SharedStore, ticket: &PredictionTicket, err: OracleError) -> Error {
        store.write().fail_prediction(ticket, &err);
        err.into()
    }
}

fn checked(response: PredictResponse) -> Result<PredictResponse, OracleError> {
    response.polygon.validated()?;
    Ok(response)
}
