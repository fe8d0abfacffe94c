use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::traits::{InferenceClient, InferenceError, InferenceRequest, InferenceResponse};
use crate::config::Config;
use crate::error::{ChartStudioError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const ERROR_BODY_CAP_CHARS: usize = 500;

/// Client for the hosted Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ChartStudioError::Config {
                message: "inference API key is empty".into(),
            });
        }
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChartStudioError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Build from loaded configuration; the API key must be present in the environment
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .runtime
            .api_key
            .clone()
            .ok_or_else(|| ChartStudioError::Config {
                message: "GEMINI_API_KEY (or API_KEY) is not set".into(),
            })?;
        Self::with_endpoint(
            api_key,
            config.inference.base_url.clone(),
            config.inference.timeout_ms,
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

fn build_body(request: &InferenceRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: WireGenerationConfig {
            response_mime_type: request.config.response_mime_type.as_deref(),
            temperature: request.config.temperature,
        },
    }
}

/// Concatenated text of the first candidate
fn extract_text(response: GenerateContentResponse) -> std::result::Result<String, InferenceError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(InferenceError::EmptyResponse);
    }
    Ok(text)
}

fn truncate_chars(input: &str, max: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in input.chars().enumerate() {
        if idx >= max {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    out
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate(
        &self,
        request: &InferenceRequest,
    ) -> std::result::Result<InferenceResponse, InferenceError> {
        debug!(
            "Calling Gemini (model={}, chars={}, temperature={})",
            request.model,
            request.prompt.len(),
            request.config.temperature
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    InferenceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), ERROR_BODY_CAP_CHARS),
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        let text = extract_text(envelope)?;
        debug!("Gemini returned {} chars", text.len());
        Ok(InferenceResponse { text })
    }
}
