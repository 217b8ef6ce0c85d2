//! Session provisioning: dataset setup and image URLs.

use async_trait::async_trait;
use maskkit_core::{ImageInfo, Session, SessionError};
use serde::{Deserialize, Serialize};

use crate::client::{parse_json, BackendClient, TransportError};

/// Parameters of a dataset session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub dataset_path: String,
    pub classes: Vec<String>,
    pub images_subfolder: String,
    pub labels_subfolder: String,
}

impl SessionRequest {
    pub fn new(dataset_path: impl Into<String>, classes: Vec<String>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            classes,
            images_subfolder: "images".to_string(),
            labels_subfolder: "labels".to_string(),
        }
    }
}

/// Supplies the image list of a dataset and pixel URLs for its images
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Scans the dataset and returns a validated session.
    async fn init_session(&self, request: &SessionRequest) -> Result<Session, SessionError>;

    /// URL from which the pixels of `image_id` can be fetched.
    fn image_url(&self, session_id: &str, image_id: &str) -> String;
}

/// Provider backed by `/api/session` and `/api/images`
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    client: BackendClient,
}

impl HttpSessionProvider {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn init_session(&self, request: &SessionRequest) -> Result<Session, SessionError> {
        if request.classes.is_empty() {
            return Err(SessionError::NoClasses);
        }

        let text = self
            .client
            .post_json("/api/session/init", request)
            .await
            .map_err(setup_failed)?;
        let session = parse_init_response(&text)?;
        tracing::info!(
            "Session {} ready: {} images, {} labeled",
            session.session_id,
            session.images.len(),
            session.labeled_count()
        );
        Ok(session)
    }

    fn image_url(&self, session_id: &str, image_id: &str) -> String {
        self.client
            .url(&format!("/api/images/{}/{}", session_id, image_id))
    }
}

fn setup_failed(err: TransportError) -> SessionError {
    SessionError::SetupFailed {
        reason: err.to_string(),
    }
}

#[derive(Deserialize)]
struct InitResponse {
    session_id: String,
    dataset_path: String,
    classes: Vec<String>,
    images: Vec<ImageInfo>,
}

/// Decodes and validates a `/api/session/init` response.
pub fn parse_init_response(json: &str) -> Result<Session, SessionError> {
    let response: InitResponse = parse_json(json).map_err(setup_failed)?;
    let session = Session {
        session_id: response.session_id,
        dataset_path: response.dataset_path,
        classes: response.classes,
        images: response.images,
    };
    session.validate()?;
    Ok(session)
}
