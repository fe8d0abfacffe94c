pub mod chart_view;
pub mod clients;
pub mod config;
pub mod error;
pub mod export;
pub mod insight;
pub mod logging;
pub mod messages;
pub mod model;
pub mod prompts;
pub mod response_parser;
pub mod session;
pub mod storage;
pub mod store;
pub mod synthesis;

use std::sync::Arc;

use crate::clients::{GeminiClient, InferenceClient};
use crate::config::Config;
use crate::error::Result;
use crate::insight::InsightService;
use crate::prompts::PromptRegistry;
use crate::session::ChartSession;
use crate::storage::FileStorage;
use crate::store::StateStore;
use crate::synthesis::DataSynthesisService;

/// Session over file storage in the configured directory, talking to the
/// given inference client
pub fn build_session(config: &Config, client: Arc<dyn InferenceClient>) -> Result<ChartSession> {
    let registry = PromptRegistry::new();
    let synthesis = DataSynthesisService::new(client.clone(), &config.inference, &registry)?;
    let insight = InsightService::new(client, &config.inference, &registry, config.locale)?;
    let store = StateStore::open(Box::new(FileStorage::new(&config.storage.dir)));
    tracing::info!(
        storage_dir = %config.storage.dir.display(),
        data_model = %config.inference.data_model,
        insight_model = %config.inference.insight_model,
        "Chart session ready"
    );
    Ok(ChartSession::new(store, synthesis, insight, config.locale))
}

/// [`build_session`] with the Gemini REST client
pub fn build_gemini_session(config: &Config) -> Result<ChartSession> {
    let client: Arc<dyn InferenceClient> = Arc::new(GeminiClient::from_config(config)?);
    build_session(config, client)
}
