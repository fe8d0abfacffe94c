//! Narrative insight over the current chart. Read-only with respect to chart state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::clients::traits::{GenerationConfig, InferenceClient, InferenceRequest};
use crate::config::InferenceConfig;
use crate::error::{ChartStudioError, Result};
use crate::messages::Locale;
use crate::model::{ChartOptions, DataItem};
use crate::prompts::{CHART_INSIGHT_PROMPT_ID, Prompt, PromptRegistry};

/// The part of a data point the model gets to see
#[derive(Debug, Serialize)]
struct Projection<'a> {
    name: &'a str,
    value: f64,
}

pub struct InsightService {
    client: Arc<dyn InferenceClient>,
    prompt: Arc<Prompt>,
    model: String,
    temperature: f32,
    locale: Locale,
}

impl InsightService {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        config: &InferenceConfig,
        registry: &PromptRegistry,
        locale: Locale,
    ) -> Result<Self> {
        let prompt = registry
            .get(CHART_INSIGHT_PROMPT_ID)
            .ok_or_else(|| ChartStudioError::Internal {
                message: format!("prompt '{}' is not registered", CHART_INSIGHT_PROMPT_ID),
            })?;
        Ok(Self {
            client,
            prompt,
            model: config.insight_model.clone(),
            temperature: config.insight_temperature,
            locale,
        })
    }

    pub fn build_request(
        &self,
        data: &[DataItem],
        options: &ChartOptions,
    ) -> Result<InferenceRequest> {
        let projection: Vec<Projection<'_>> = data
            .iter()
            .map(|item| Projection {
                name: &item.name,
                value: item.value,
            })
            .collect();
        let data_literal = serde_json::to_string(&projection)?;
        let prompt = self.prompt.render(&[
            ("title", options.title.as_str()),
            ("chart_type", options.chart_type.as_str()),
            ("data", data_literal.as_str()),
            ("language", self.locale.language_name()),
        ]);
        Ok(InferenceRequest {
            model: self.model.clone(),
            prompt,
            config: GenerationConfig {
                response_mime_type: None,
                temperature: self.temperature,
            },
        })
    }

    /// Free-text analysis of `data` as currently charted. The model's text is
    /// returned as-is.
    pub async fn summarize(&self, data: &[DataItem], options: &ChartOptions) -> Result<String> {
        let result: Result<String> = async {
            let request = self.build_request(data, options)?;
            let response = self.client.generate(&request).await?;
            if response.text.trim().is_empty() {
                return Err(ChartStudioError::transport("inference API returned empty text"));
            }
            Ok(response.text)
        }
        .await;

        match &result {
            Ok(text) => info!(
                prompt_id = %self.prompt.id,
                prompt_version = %self.prompt.version,
                checksum = %self.prompt.checksum,
                "Generated insight ({} chars) for {} data points",
                text.len(),
                data.len()
            ),
            Err(e) => error!(
                category = %e.category(),
                prompt_id = %self.prompt.id,
                "Error generating chart insights: {}",
                e
            ),
        }
        result
    }
}
