//! Shared test doubles for the inference flows

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chart_studio::clients::{InferenceClient, InferenceError, InferenceRequest, InferenceResponse};
use chart_studio::config::InferenceConfig;
use chart_studio::insight::InsightService;
use chart_studio::messages::Locale;
use chart_studio::prompts::PromptRegistry;
use chart_studio::session::ChartSession;
use chart_studio::storage::MemoryStorage;
use chart_studio::store::StateStore;
use chart_studio::synthesis::DataSynthesisService;
use tokio::sync::Notify;

struct Step {
    reply: Result<String, InferenceError>,
    gate: Option<Arc<Notify>>,
}

/// Replays canned replies in order and records every request it saw
#[derive(Clone, Default)]
pub struct ScriptedClient {
    steps: Arc<Mutex<VecDeque<Step>>>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()), None);
        self
    }

    pub fn fail(self, error: InferenceError) -> Self {
        self.push(Err(error), None);
        self
    }

    /// Reply that is held back until the returned handle is notified
    pub fn gated_reply(&self, text: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(Ok(text.into()), Some(gate.clone()));
        gate
    }

    pub fn gated_failure(&self, error: InferenceError) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(Err(error), Some(gate.clone()));
        gate
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, reply: Result<String, InferenceError>, gate: Option<Arc<Notify>>) {
        self.steps.lock().unwrap().push_back(Step { reply, gate });
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted client ran out of replies");
        if let Some(gate) = step.gate {
            gate.notified().await;
        }
        step.reply.map(|text| InferenceResponse { text })
    }
}

pub fn synthesis_service(client: &ScriptedClient) -> DataSynthesisService {
    DataSynthesisService::new(
        Arc::new(client.clone()),
        &InferenceConfig::default(),
        &PromptRegistry::new(),
    )
    .unwrap()
}

pub fn insight_service(client: &ScriptedClient, locale: Locale) -> InsightService {
    InsightService::new(
        Arc::new(client.clone()),
        &InferenceConfig::default(),
        &PromptRegistry::new(),
        locale,
    )
    .unwrap()
}

pub fn session(client: &ScriptedClient, storage: &MemoryStorage) -> ChartSession {
    ChartSession::new(
        StateStore::open(Box::new(storage.clone())),
        synthesis_service(client),
        insight_service(client, Locale::Es),
        Locale::Es,
    )
}

pub const SIX_MONTHS_FENCED: &str = "```json\n[{\"name\":\"Jan\",\"value\":100},{\"name\":\"Feb\",\"value\":120},{\"name\":\"Mar\",\"value\":90},{\"name\":\"Apr\",\"value\":130},{\"name\":\"May\",\"value\":150},{\"name\":\"Jun\",\"value\":170}]\n```";
