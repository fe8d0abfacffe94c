//! Data synthesis: natural-language description in, validated chart data out.
//!
//! The model is asked for JSON, but that request is only a hint. Every
//! response goes through fence stripping, decoding and a schema check before
//! anything becomes a [`DataItem`], and ids are always generated here.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::clients::traits::{GenerationConfig, InferenceClient, InferenceRequest};
use crate::config::InferenceConfig;
use crate::error::{ChartStudioError, Result};
use crate::model::{DataItem, new_item_id};
use crate::prompts::{CHART_DATA_PROMPT_ID, Prompt, PromptRegistry};
use crate::response_parser;

pub const JSON_MIME_TYPE: &str = "application/json";

/// Largest magnitude accepted from the model. Beyond this, integer values
/// lose precision and axis/tick computation in the renderer degrades.
pub const MAX_ABS_VALUE: f64 = 9_007_199_254_740_991.0;

pub struct DataSynthesisService {
    client: Arc<dyn InferenceClient>,
    prompt: Arc<Prompt>,
    model: String,
    temperature: f32,
}

impl DataSynthesisService {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        config: &InferenceConfig,
        registry: &PromptRegistry,
    ) -> Result<Self> {
        let prompt = registry
            .get(CHART_DATA_PROMPT_ID)
            .ok_or_else(|| ChartStudioError::Internal {
                message: format!("prompt '{}' is not registered", CHART_DATA_PROMPT_ID),
            })?;
        Ok(Self {
            client,
            prompt,
            model: config.data_model.clone(),
            temperature: config.data_temperature,
        })
    }

    pub fn build_request(&self, prompt_text: &str) -> InferenceRequest {
        InferenceRequest {
            model: self.model.clone(),
            prompt: self.prompt.render(&[("prompt", prompt_text)]),
            config: GenerationConfig {
                response_mime_type: Some(JSON_MIME_TYPE.to_string()),
                temperature: self.temperature,
            },
        }
    }

    /// Ask the model for a dataset matching `prompt_text`.
    ///
    /// Callers skip empty prompts before getting here. Nothing is retried and
    /// no shared state is touched; the caller applies the result.
    pub async fn synthesize(&self, prompt_text: &str) -> Result<Vec<DataItem>> {
        let result = self.synthesize_inner(prompt_text).await;
        match &result {
            Ok(items) => info!(
                prompt_id = %self.prompt.id,
                prompt_version = %self.prompt.version,
                checksum = %self.prompt.checksum,
                "Synthesized {} data points",
                items.len()
            ),
            Err(e) => error!(
                category = %e.category(),
                prompt_id = %self.prompt.id,
                "Error generating chart data: {}",
                e
            ),
        }
        result
    }

    async fn synthesize_inner(&self, prompt_text: &str) -> Result<Vec<DataItem>> {
        let request = self.build_request(prompt_text);
        let response = self.client.generate(&request).await?;
        let decoded: Value = response_parser::parse(&response.text)?;
        let items = validate_synthesized(decoded)?;
        if items.is_empty() {
            warn!("Model returned an empty dataset");
        }
        Ok(items)
    }
}

/// Check the decoded model output against the data point schema and turn it
/// into items with fresh ids. All-or-nothing: one bad element rejects the set.
pub fn validate_synthesized(decoded: Value) -> Result<Vec<DataItem>> {
    let elements = match decoded {
        Value::Array(elements) => elements,
        other => {
            return Err(ChartStudioError::validation(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut records = Vec::with_capacity(elements.len());
    let mut model_ids = HashSet::new();
    for (index, element) in elements.into_iter().enumerate() {
        let mut fields = match element {
            Value::Object(fields) => fields,
            other => {
                return Err(ChartStudioError::validation(format!(
                    "element {index} is {}, expected an object",
                    json_kind(&other)
                )));
            }
        };
        let name = match fields.remove("name") {
            Some(Value::String(name)) => name,
            other => {
                return Err(ChartStudioError::validation(format!(
                    "element {index}: \"name\" must be a string, got {}",
                    other.as_ref().map(json_kind).unwrap_or("nothing")
                )));
            }
        };
        let value = match fields.remove("value") {
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                ChartStudioError::validation(format!(
                    "element {index}: \"value\" is not a finite number"
                ))
            })?,
            other => {
                return Err(ChartStudioError::validation(format!(
                    "element {index}: \"value\" must be a number, got {}",
                    other.as_ref().map(json_kind).unwrap_or("nothing")
                )));
            }
        };
        if value.abs() > MAX_ABS_VALUE {
            return Err(ChartStudioError::validation(format!(
                "element {index}: \"value\" {value} is out of range"
            )));
        }
        if let Some(id) = fields.remove("id") {
            model_ids.insert(id_text(&id));
        }
        records.push((name, value, fields));
    }

    let mut issued = HashSet::with_capacity(records.len());
    Ok(records
        .into_iter()
        .map(|(name, value, extra)| {
            let mut id = new_item_id();
            while model_ids.contains(&id) || issued.contains(&id) {
                id = new_item_id();
            }
            issued.insert(id.clone());
            DataItem {
                id,
                name,
                value,
                extra,
            }
        })
        .collect())
}

fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
