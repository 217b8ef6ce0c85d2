//! Annotation data model.
//!
//! `AnnotationObject` keeps three derived views of one polygon: the image-space
//! ring, its normalized mirror and its clamped bounding box. They are only ever
//! written together through [`AnnotationObject::set_polygon`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SessionError;
use crate::geometry::{self, pairs, BoundingBox, ImageSize, Point, Ring};

/// Opaque identifier of an annotation object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolMode {
    /// Pick objects and add refinement points
    #[default]
    Select,
    /// Drag a box to request a new mask
    BoundingBox,
    /// Freehand strokes that grow or cut the selected polygon
    Lasso,
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::BoundingBox => write!(f, "boundingBox"),
            Self::Lasso => write!(f, "lasso"),
        }
    }
}

/// Boolean operation applied by a lasso stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LassoMode {
    /// Union the stroke into the polygon
    #[default]
    Add,
    /// Cut the stroke out of the polygon
    Subtract,
}

impl fmt::Display for LassoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Subtract => write!(f, "subtract"),
        }
    }
}

/// One annotated instance on an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationObject {
    pub id: ObjectId,
    pub class_id: usize,
    pub class_name: String,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub points_pos: Vec<Point>,
    #[serde(default)]
    pub points_neg: Vec<Point>,
    #[serde(with = "pairs")]
    pub polygon: Ring,
    #[serde(with = "pairs", default)]
    pub polygon_normalized: Ring,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl AnnotationObject {
    /// Builds an object whose derived fields are computed from `polygon`.
    pub fn from_polygon(
        id: ObjectId,
        class_id: usize,
        class_name: impl Into<String>,
        polygon: Ring,
        size: ImageSize,
        score: Option<f64>,
    ) -> Self {
        let mut object = Self {
            id,
            class_id,
            class_name: class_name.into(),
            bbox: BoundingBox::default(),
            points_pos: Vec::new(),
            points_neg: Vec::new(),
            polygon: Vec::new(),
            polygon_normalized: Vec::new(),
            score,
        };
        object.set_polygon(polygon, size);
        object
    }

    /// Replaces the polygon and recomputes the normalized ring and the bbox.
    pub fn set_polygon(&mut self, polygon: Ring, size: ImageSize) {
        self.polygon_normalized = geometry::normalize(&polygon, size);
        self.bbox = geometry::bounds(&polygon)
            .map(|b| b.clamp_to(size))
            .unwrap_or_default();
        self.polygon = polygon;
    }

    /// Hit test against the polygon.
    pub fn contains_point(&self, point: &Point) -> bool {
        geometry::contains_point(&self.polygon, point)
    }

    /// Absolute polygon area.
    pub fn area(&self) -> f64 {
        geometry::area(&self.polygon)
    }
}

/// One image of the dataset, as provisioned by the session provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub filename: String,
    pub path: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub has_labels: bool,
}

impl ImageInfo {
    pub fn size(&self) -> ImageSize {
        ImageSize::new(f64::from(self.width), f64::from(self.height))
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        std::path::Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }
}

/// Dataset-level setup: classes and images. Replaced wholesale on re-setup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub dataset_path: String,
    pub classes: Vec<String>,
    pub images: Vec<ImageInfo>,
}

impl Session {
    /// Checks that the session has classes and images to work with.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.classes.is_empty() {
            return Err(SessionError::NoClasses);
        }
        if self.images.is_empty() {
            return Err(SessionError::NoImages {
                dataset_path: self.dataset_path.clone(),
            });
        }
        Ok(())
    }

    pub fn image(&self, image_id: &str) -> Option<&ImageInfo> {
        self.images.iter().find(|i| i.id == image_id)
    }

    pub fn image_mut(&mut self, image_id: &str) -> Option<&mut ImageInfo> {
        self.images.iter_mut().find(|i| i.id == image_id)
    }

    /// Label of a class index, `class_{id}` when out of range.
    pub fn class_name(&self, class_id: usize) -> String {
        class_label(&self.classes, class_id)
    }

    pub fn labeled_count(&self) -> usize {
        self.images.iter().filter(|i| i.has_labels).count()
    }
}

/// Resolves a class label from an ordered class list.
pub fn class_label(classes: &[String], class_id: usize) -> String {
    classes
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}
