//! Coordinates the two inference flows with the state store.
//!
//! Data generation and insight generation run independently and never wait
//! on each other. Within one kind, each request is stamped with a sequence
//! number; a result that arrives after a newer request of the same kind was
//! issued is discarded instead of overwriting fresher state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{ChartStudioError, Result};
use crate::insight::InsightService;
use crate::messages::{Locale, Operation};
use crate::model::{ChartOptionsPatch, DataItem};
use crate::store::{ApplicationState, StateStore};
use crate::synthesis::DataSynthesisService;

/// What happened to a request's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Empty prompt; nothing was sent
    Skipped,
    /// A newer request of the same kind was issued first; result dropped
    Stale,
}

#[derive(Debug, Default)]
struct Flow {
    issued: AtomicU64,
    outstanding: AtomicUsize,
}

impl Flow {
    fn begin(&self) -> Ticket<'_> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Ticket { flow: self, seq }
    }
}

/// Marks one outstanding request; released on drop, including when the
/// request future is cancelled.
struct Ticket<'a> {
    flow: &'a Flow,
    seq: u64,
}

impl Ticket<'_> {
    fn is_current(&self) -> bool {
        self.flow.issued.load(Ordering::SeqCst) == self.seq
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.flow.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct Status {
    last_error: Option<String>,
    insight: Option<String>,
}

struct Inner {
    store: Mutex<StateStore>,
    synthesis: DataSynthesisService,
    insight: InsightService,
    locale: Locale,
    data_flow: Flow,
    insight_flow: Flow,
    status: RwLock<Status>,
}

/// Shared handle; clones refer to the same session
#[derive(Clone)]
pub struct ChartSession {
    inner: Arc<Inner>,
}

impl ChartSession {
    pub fn new(
        store: StateStore,
        synthesis: DataSynthesisService,
        insight: InsightService,
        locale: Locale,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                synthesis,
                insight,
                locale,
                data_flow: Flow::default(),
                insight_flow: Flow::default(),
                status: RwLock::new(Status::default()),
            }),
        }
    }

    pub fn locale(&self) -> Locale {
        self.inner.locale
    }

    /// Generate a dataset from `prompt` and make it the chart's data. The
    /// prompt is sent as typed; a blank one sends nothing.
    pub async fn generate_data(&self, prompt: &str) -> Result<Outcome> {
        if prompt.trim().is_empty() {
            debug!("Skipping data generation for an empty prompt");
            return Ok(Outcome::Skipped);
        }

        let ticket = self.inner.data_flow.begin();
        self.reset_status().await;

        let result = self.inner.synthesis.synthesize(prompt).await;
        let mut store = self.inner.store.lock().await;
        if !ticket.is_current() {
            info!(seq = ticket.seq, "Discarding stale data generation result");
            return Ok(Outcome::Stale);
        }
        let applied = result.and_then(|items| {
            info!(seq = ticket.seq, "Applying {} generated data points", items.len());
            store.replace_data(items)
        });
        drop(store);
        match applied {
            Ok(()) => Ok(Outcome::Applied),
            Err(e) => {
                self.record_failure(&e, Operation::GenerateData).await;
                Err(e)
            }
        }
    }

    /// Ask for a narrative reading of the chart as it is right now
    pub async fn generate_insights(&self) -> Result<Outcome> {
        let ticket = self.inner.insight_flow.begin();
        self.reset_status().await;

        let snapshot = self.state().await;
        let result = self
            .inner
            .insight
            .summarize(&snapshot.data_items, &snapshot.chart_options)
            .await;
        if !ticket.is_current() {
            info!(seq = ticket.seq, "Discarding stale insight result");
            return Ok(Outcome::Stale);
        }
        match result {
            Ok(text) => {
                self.inner.status.write().await.insight = Some(text);
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.record_failure(&e, Operation::GenerateInsights).await;
                Err(e)
            }
        }
    }

    /// Manual entry. Invalid input leaves the data unchanged and records the
    /// edit failure message.
    pub async fn add_item(&self, name: &str, value: f64) -> Result<DataItem> {
        let added = {
            let mut store = self.inner.store.lock().await;
            store.add_item(name, value).map(DataItem::clone)
        };
        if let Err(e) = &added {
            self.record_failure(e, Operation::EditData).await;
        }
        added
    }

    pub async fn remove_item(&self, id: &str) -> bool {
        self.inner.store.lock().await.remove_item(id)
    }

    pub async fn update_options(&self, patch: ChartOptionsPatch) {
        self.inner.store.lock().await.replace_options(patch);
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        let flow = match operation {
            Operation::GenerateData => &self.inner.data_flow,
            Operation::GenerateInsights => &self.inner.insight_flow,
            Operation::EditData => return false,
        };
        flow.outstanding.load(Ordering::SeqCst) > 0
    }

    /// Localized message for the most recent failure, if any
    pub async fn last_error(&self) -> Option<String> {
        self.inner.status.read().await.last_error.clone()
    }

    pub async fn insight(&self) -> Option<String> {
        self.inner.status.read().await.insight.clone()
    }

    pub async fn state(&self) -> ApplicationState {
        self.inner.store.lock().await.snapshot()
    }

    async fn reset_status(&self) {
        let mut status = self.inner.status.write().await;
        status.last_error = None;
        status.insight = None;
    }

    async fn record_failure(&self, error: &ChartStudioError, operation: Operation) {
        warn!(
            category = %error.category(),
            operation = %operation,
            "Operation failed: {}",
            error
        );
        let message = error.user_message(self.inner.locale, operation);
        self.inner.status.write().await.last_error = Some(message.to_string());
    }
}
