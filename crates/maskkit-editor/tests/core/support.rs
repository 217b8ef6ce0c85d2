#![allow(dead_code)]

use async_trait::async_trait;
use maskkit_communication::{
    AutoAnnotateRequest, AutoAnnotateResponse, LabelStore, LoadOutcome, PolygonResult,
    PredictRequest, PredictResponse, SaveOutcome, SegmentationOracle, TextPredictRequest,
    TextPredictResponse,
};
use maskkit_core::{
    geometry, AnnotationObject, BoundingBox, ImageInfo, ImageSize, LabelError, ObjectId,
    OracleError, Ring, Session,
};
use maskkit_editor::{SessionStore, SharedStore};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

pub const IMAGE_SIZE: f64 = 200.0;

pub fn session() -> Session {
    Session {
        session_id: "s1".to_string(),
        dataset_path: "/data/streets".to_string(),
        classes: vec!["car".to_string(), "person".to_string()],
        images: vec![
            ImageInfo {
                id: "img1".to_string(),
                filename: "street_01.jpg".to_string(),
                path: "/data/streets/images/street_01.jpg".to_string(),
                width: IMAGE_SIZE as u32,
                height: IMAGE_SIZE as u32,
                has_labels: false,
            },
            ImageInfo {
                id: "img2".to_string(),
                filename: "street_02.jpg".to_string(),
                path: "/data/streets/images/street_02.jpg".to_string(),
                width: 640,
                height: 480,
                has_labels: false,
            },
        ],
    }
}

pub fn size() -> ImageSize {
    ImageSize::new(IMAGE_SIZE, IMAGE_SIZE)
}

pub fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
    BoundingBox::new(x0, y0, x1, y1).to_ring()
}

pub fn object(id: &str, ring: Ring) -> AnnotationObject {
    AnnotationObject::from_polygon(ObjectId::from(id), 0, "car", ring, size(), Some(0.9))
}

/// Store with the test session and `img1` active.
pub fn store() -> SessionStore {
    let mut store = SessionStore::new();
    store.set_session(session()).expect("session");
    store.switch_image("img1").expect("switch");
    store
}

pub fn shared(store: SessionStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}

pub fn response(ring: Ring, score: f64) -> PredictResponse {
    PredictResponse {
        polygon_normalized: geometry::normalize(&ring, size()),
        polygon: PolygonResult {
            area: geometry::area(&ring),
            points: ring,
            is_valid: true,
        },
        score,
        mask_base64: None,
        inference_time_ms: 12.0,
    }
}

/// Oracle answering every call with the same scripted results.
pub struct FixedOracle {
    predict: Result<PredictResponse, OracleError>,
    text: Result<TextPredictResponse, OracleError>,
    auto: Result<AutoAnnotateResponse, OracleError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<PredictRequest>>,
}

impl FixedOracle {
    pub fn new(predict: Result<PredictResponse, OracleError>) -> Self {
        Self {
            predict,
            text: Ok(TextPredictResponse {
                results: Vec::new(),
                count: 0,
            }),
            auto: Ok(AutoAnnotateResponse {
                results: Vec::new(),
            }),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_text(mut self, text: Result<TextPredictResponse, OracleError>) -> Self {
        self.text = text;
        self
    }

    pub fn with_auto(mut self, auto: Result<AutoAnnotateResponse, OracleError>) -> Self {
        self.auto = auto;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PredictRequest> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl SegmentationOracle for FixedOracle {
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request);
        self.predict.clone()
    }

    async fn predict_text(
        &self,
        _request: TextPredictRequest,
    ) -> Result<TextPredictResponse, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }

    async fn auto_annotate(
        &self,
        _request: AutoAnnotateRequest,
    ) -> Result<AutoAnnotateResponse, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.auto.clone()
    }
}

type Gate = oneshot::Receiver<Result<PredictResponse, OracleError>>;

/// Oracle whose answers are released by the test, in any order.
#[derive(Default)]
pub struct GatedOracle {
    gates: Mutex<VecDeque<Gate>>,
    calls: AtomicUsize,
}

impl GatedOracle {
    /// Prepares the answer slot for the next call.
    pub fn gate(&self) -> oneshot::Sender<Result<PredictResponse, OracleError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yields until `count` calls reached the oracle.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SegmentationOracle for GatedOracle {
    async fn predict(&self, _request: PredictRequest) -> Result<PredictResponse, OracleError> {
        let gate = self.gates.lock().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(OracleError::RequestFailed {
                    reason: "gate dropped".to_string(),
                })
            }),
            None => Err(OracleError::RequestFailed {
                reason: "no gate prepared".to_string(),
            }),
        }
    }
}

/// In-memory label store.
#[derive(Default)]
pub struct MemoryLabelStore {
    labels: Mutex<HashMap<String, Vec<AnnotationObject>>>,
    fail_saves: bool,
    saves: AtomicUsize,
}

impl MemoryLabelStore {
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn with_labels(image_id: &str, objects: Vec<AnnotationObject>) -> Self {
        let store = Self::default();
        store.labels.lock().insert(image_id.to_string(), objects);
        store
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self, image_id: &str) -> Option<Vec<AnnotationObject>> {
        self.labels.lock().get(image_id).cloned()
    }
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    async fn save(
        &self,
        image: &ImageInfo,
        objects: &[AnnotationObject],
    ) -> Result<SaveOutcome, LabelError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(LabelError::SaveFailed {
                image_id: image.id.clone(),
                reason: "disk full".to_string(),
            });
        }
        self.labels.lock().insert(image.id.clone(), objects.to_vec());
        Ok(SaveOutcome {
            success: true,
            filepath: format!("memory://{}", image.id),
            objects_saved: objects.len(),
        })
    }

    async fn load(
        &self,
        image: &ImageInfo,
        _classes: &[String],
    ) -> Result<LoadOutcome, LabelError> {
        let objects = self.labels.lock().get(&image.id).cloned();
        Ok(LoadOutcome {
            image_id: image.id.clone(),
            exists: objects.is_some(),
            objects: objects.unwrap_or_default(),
        })
    }

    async fn delete(&self, image: &ImageInfo) -> Result<bool, LabelError> {
        Ok(self.labels.lock().remove(&image.id).is_some())
    }

    async fn exists(&self, image: &ImageInfo) -> Result<bool, LabelError> {
        Ok(self.labels.lock().contains_key(&image.id))
    }
}
