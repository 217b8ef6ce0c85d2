//! Segmentation oracle over the backend's `/api/sam` routes.

use async_trait::async_trait;
use maskkit_core::OracleError;
use serde::Serialize;

use super::{
    AutoAnnotateRequest, AutoAnnotateResponse, ModelsList, OracleStatus, PredictRequest,
    PredictResponse, SegmentationOracle, SwitchModelResponse, TextPredictRequest,
    TextPredictResponse,
};
use crate::client::{parse_json, BackendClient, TransportError};

impl From<TransportError> for OracleError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Build(reason) => OracleError::HttpClientBuild(reason),
            TransportError::Request(reason) => OracleError::RequestFailed { reason },
            TransportError::Status { status, body } => OracleError::Rejected { status, body },
            TransportError::Decode(reason) => OracleError::InvalidResponse { reason },
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Oracle client bound to one backend session
#[derive(Debug, Clone)]
pub struct HttpSegmentationClient {
    client: BackendClient,
    session_id: String,
}

impl HttpSegmentationClient {
    pub fn new(client: BackendClient, session_id: impl Into<String>) -> Self {
        Self {
            client,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Lists the models the backend can serve.
    pub async fn list_models(&self) -> Result<ModelsList, OracleError> {
        let text = self.client.get("/api/sam/models").await?;
        Ok(parse_json(&text)?)
    }

    /// Asks the backend to load a different model.
    pub async fn switch_model(&self, model_id: &str) -> Result<SwitchModelResponse, OracleError> {
        let body = SwitchModelBody { model_id };
        let text = self.client.post_json("/api/sam/models/switch", &body).await?;
        let response: SwitchModelResponse = parse_json(&text)?;
        tracing::info!("Switched oracle model to {}", response.model_id);
        Ok(response)
    }

    pub async fn status(&self) -> Result<OracleStatus, OracleError> {
        let text = self.client.get("/api/sam/status").await?;
        Ok(parse_json(&text)?)
    }
}

#[async_trait]
impl SegmentationOracle for HttpSegmentationClient {
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, OracleError> {
        let path = format!("/api/sam/predict/{}", self.session_id);
        let text = self.client.post_json(&path, &request).await?;
        let response = parse_predict_response(&text)?;
        tracing::debug!(
            "Prediction for {} took {:.1}ms (score {:.3})",
            request.image_id,
            response.inference_time_ms,
            response.score
        );
        Ok(response)
    }

    async fn predict_text(
        &self,
        request: TextPredictRequest,
    ) -> Result<TextPredictResponse, OracleError> {
        let path = format!("/api/sam/predict-text/{}", self.session_id);
        let text = self.client.post_json(&path, &request).await?;
        Ok(parse_json(&text)?)
    }

    async fn auto_annotate(
        &self,
        request: AutoAnnotateRequest,
    ) -> Result<AutoAnnotateResponse, OracleError> {
        let path = format!("/api/sam/auto-annotate/{}", self.session_id);
        let text = self.client.post_json(&path, &request).await?;
        Ok(parse_json(&text)?)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct SwitchModelBody<'a> {
    model_id: &'a str,
}

// =============================================================================
// PARSING
// =============================================================================

/// Decodes a `/predict` response body.
pub fn parse_predict_response(json: &str) -> Result<PredictResponse, OracleError> {
    Ok(parse_json(json)?)
}
