use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ChartStudioError;

/// Generation knobs sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Structured-output hint, e.g. `application/json`. A hint, not a guarantee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub model: String,
    pub prompt: String,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("inference API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("inference API returned no text")]
    EmptyResponse,
    #[error("could not decode inference API envelope: {0}")]
    Decode(String),
}

impl From<InferenceError> for ChartStudioError {
    fn from(err: InferenceError) -> Self {
        ChartStudioError::Transport {
            message: err.to_string(),
        }
    }
}

/// The hosted text-generation service
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, request: &InferenceRequest)
    -> Result<InferenceResponse, InferenceError>;
}
