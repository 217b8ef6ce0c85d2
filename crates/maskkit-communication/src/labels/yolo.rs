//! YOLO segmentation label files.
//!
//! One `<image stem>.txt` per image under `<dataset>/<labels>/`, one line per
//! object: `class_id x1 y1 x2 y2 ...` with coordinates normalized to `[0, 1]`
//! and printed with six decimals.

use async_trait::async_trait;
use maskkit_core::constants::MIN_RING_POINTS;
use maskkit_core::geometry::{self, ImageSize, Point};
use maskkit_core::{class_label, AnnotationObject, ImageInfo, LabelError, ObjectId};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::{LabelStore, LoadOutcome, SaveOutcome};

/// Label store backed by YOLO-seg text files
#[derive(Debug, Clone)]
pub struct YoloSegLabelStore {
    labels_dir: PathBuf,
}

impl YoloSegLabelStore {
    pub fn new(dataset_path: impl AsRef<Path>, labels_subfolder: &str) -> Self {
        Self {
            labels_dir: dataset_path.as_ref().join(labels_subfolder),
        }
    }

    pub fn labels_dir(&self) -> &Path {
        &self.labels_dir
    }

    /// Path of the label file belonging to `image`.
    pub fn label_path(&self, image: &ImageInfo) -> PathBuf {
        self.labels_dir.join(format!("{}.txt", image.stem()))
    }
}

#[async_trait]
impl LabelStore for YoloSegLabelStore {
    async fn save(
        &self,
        image: &ImageInfo,
        objects: &[AnnotationObject],
    ) -> Result<SaveOutcome, LabelError> {
        let fail = |reason: String| LabelError::SaveFailed {
            image_id: image.id.clone(),
            reason,
        };

        let content = format_labels(image, objects)?;
        tokio::fs::create_dir_all(&self.labels_dir)
            .await
            .map_err(|e| fail(e.to_string()))?;

        let path = self.label_path(image);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| fail(e.to_string()))?;

        tracing::info!("Wrote {} objects to {}", objects.len(), path.display());
        Ok(SaveOutcome {
            success: true,
            filepath: path.display().to_string(),
            objects_saved: objects.len(),
        })
    }

    async fn load(
        &self,
        image: &ImageInfo,
        classes: &[String],
    ) -> Result<LoadOutcome, LabelError> {
        let path = self.label_path(image);
        if !self.exists(image).await? {
            return Ok(LoadOutcome {
                image_id: image.id.clone(),
                exists: false,
                objects: Vec::new(),
            });
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LabelError::LoadFailed {
                image_id: image.id.clone(),
                reason: e.to_string(),
            })?;

        Ok(LoadOutcome {
            image_id: image.id.clone(),
            exists: true,
            objects: parse_labels(&content, image.size(), classes),
        })
    }

    async fn delete(&self, image: &ImageInfo) -> Result<bool, LabelError> {
        let path = self.label_path(image);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LabelError::DeleteFailed {
                image_id: image.id.clone(),
                reason: e.to_string(),
            }),
        }
    }

    async fn exists(&self, image: &ImageInfo) -> Result<bool, LabelError> {
        tokio::fs::try_exists(self.label_path(image))
            .await
            .map_err(|e| LabelError::LoadFailed {
                image_id: image.id.clone(),
                reason: e.to_string(),
            })
    }
}

/// Renders objects as YOLO-seg lines.
///
/// Uses the stored normalized ring when present, otherwise normalizes the
/// image-space polygon by the size of `image`.
pub fn format_labels(
    image: &ImageInfo,
    objects: &[AnnotationObject],
) -> Result<String, LabelError> {
    let size = image.size();
    let mut lines = Vec::with_capacity(objects.len());
    for object in objects {
        let normalized = if object.polygon_normalized.is_empty() {
            if !size.is_valid() {
                return Err(LabelError::SaveFailed {
                    image_id: image.id.clone(),
                    reason: format!(
                        "cannot normalize {} against image size {}x{}",
                        object.id, size.width, size.height
                    ),
                });
            }
            geometry::normalize(&object.polygon, size)
        } else {
            object.polygon_normalized.clone()
        };

        let mut line = object.class_id.to_string();
        for p in &normalized {
            let _ = write!(line, " {:.6} {:.6}", p.x, p.y);
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Parses YOLO-seg lines, skipping anything malformed.
pub fn parse_labels(content: &str, size: ImageSize, classes: &[String]) -> Vec<AnnotationObject> {
    let mut objects = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 1 + 2 * MIN_RING_POINTS {
            tracing::debug!("Skipping short label line {}", idx);
            continue;
        }

        let Ok(class_id) = parts[0].parse::<usize>() else {
            continue;
        };
        let coords: Result<Vec<f64>, _> = parts[1..].iter().map(|s| s.parse::<f64>()).collect();
        let Ok(coords) = coords else {
            continue;
        };
        if coords.len() % 2 != 0 {
            continue;
        }

        let normalized: Vec<Point> = coords
            .chunks_exact(2)
            .map(|c| Point::new(c[0], c[1]))
            .collect();
        let polygon = geometry::denormalize(&normalized, size);

        objects.push(AnnotationObject::from_polygon(
            ObjectId::from(format!("obj_{}_{}", idx, class_id)),
            class_id,
            class_label(classes, class_id),
            polygon,
            size,
            None,
        ));
    }
    objects
}
