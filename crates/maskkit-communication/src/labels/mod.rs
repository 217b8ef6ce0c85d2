//! Label persistence boundary.
//!
//! Two stores implement [`LabelStore`]: the backend's `/api/labels` routes
//! ([`HttpLabelStore`]) and YOLO segmentation text files on local disk
//! ([`YoloSegLabelStore`]).

pub mod http;
pub mod yolo;

use async_trait::async_trait;
use maskkit_core::{AnnotationObject, ImageInfo, LabelError};
use serde::{Deserialize, Serialize};

pub use http::HttpLabelStore;
pub use yolo::YoloSegLabelStore;

/// Result of a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub filepath: String,
    pub objects_saved: usize,
}

/// Result of a load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    #[serde(default)]
    pub image_id: String,
    pub exists: bool,
    #[serde(default)]
    pub objects: Vec<AnnotationObject>,
}

/// Storage for the annotation objects of one image
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Replaces the stored labels of `image` with `objects`.
    async fn save(
        &self,
        image: &ImageInfo,
        objects: &[AnnotationObject],
    ) -> Result<SaveOutcome, LabelError>;

    /// Reads the stored labels of `image`; `classes` resolves class labels.
    async fn load(&self, image: &ImageInfo, classes: &[String]) -> Result<LoadOutcome, LabelError>;

    /// Removes the stored labels. Returns false when there was nothing to remove.
    async fn delete(&self, image: &ImageInfo) -> Result<bool, LabelError>;

    /// Whether labels are stored for `image`.
    async fn exists(&self, image: &ImageInfo) -> Result<bool, LabelError>;
}
