//! Label store over the backend's `/api/labels` routes.

use async_trait::async_trait;
use maskkit_core::{AnnotationObject, ImageInfo, LabelError};
use serde::{Deserialize, Serialize};

use super::{LabelStore, LoadOutcome, SaveOutcome};
use crate::client::{parse_json, BackendClient, TransportError};

/// Remote label store bound to one backend session
#[derive(Debug, Clone)]
pub struct HttpLabelStore {
    client: BackendClient,
    session_id: String,
}

impl HttpLabelStore {
    pub fn new(client: BackendClient, session_id: impl Into<String>) -> Self {
        Self {
            client,
            session_id: session_id.into(),
        }
    }
}

fn label_error(
    err: TransportError,
    image: &ImageInfo,
    make: fn(String, String) -> LabelError,
) -> LabelError {
    match err {
        TransportError::Status { status, body } => LabelError::Rejected { status, body },
        other => make(image.id.clone(), other.to_string()),
    }
}

fn save_failed(image_id: String, reason: String) -> LabelError {
    LabelError::SaveFailed { image_id, reason }
}

fn load_failed(image_id: String, reason: String) -> LabelError {
    LabelError::LoadFailed { image_id, reason }
}

fn delete_failed(image_id: String, reason: String) -> LabelError {
    LabelError::DeleteFailed { image_id, reason }
}

#[async_trait]
impl LabelStore for HttpLabelStore {
    async fn save(
        &self,
        image: &ImageInfo,
        objects: &[AnnotationObject],
    ) -> Result<SaveOutcome, LabelError> {
        let path = format!("/api/labels/save/{}", self.session_id);
        let body = SaveBody {
            image_id: &image.id,
            objects,
        };
        let text = self
            .client
            .post_json(&path, &body)
            .await
            .map_err(|e| label_error(e, image, save_failed))?;
        let outcome: SaveOutcome =
            parse_json(&text).map_err(|e| label_error(e, image, save_failed))?;
        if !outcome.success {
            return Err(save_failed(
                image.id.clone(),
                "backend reported failure".to_string(),
            ));
        }
        Ok(outcome)
    }

    async fn load(
        &self,
        image: &ImageInfo,
        _classes: &[String],
    ) -> Result<LoadOutcome, LabelError> {
        let path = format!("/api/labels/load/{}/{}", self.session_id, image.id);
        let text = self
            .client
            .get(&path)
            .await
            .map_err(|e| label_error(e, image, load_failed))?;
        parse_json(&text).map_err(|e| label_error(e, image, load_failed))
    }

    async fn delete(&self, image: &ImageInfo) -> Result<bool, LabelError> {
        let path = format!("/api/labels/delete/{}/{}", self.session_id, image.id);
        let text = self
            .client
            .delete(&path)
            .await
            .map_err(|e| label_error(e, image, delete_failed))?;
        let reply: DeleteReply =
            parse_json(&text).map_err(|e| label_error(e, image, delete_failed))?;
        Ok(reply.success)
    }

    async fn exists(&self, image: &ImageInfo) -> Result<bool, LabelError> {
        Ok(self.load(image, &[]).await?.exists)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct SaveBody<'a> {
    image_id: &'a str,
    objects: &'a [AnnotationObject],
}

#[derive(Deserialize)]
struct DeleteReply {
    #[serde(default)]
    success: bool,
}
