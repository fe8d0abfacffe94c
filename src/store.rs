//! Application state store: the single owner of chart data and options.
//!
//! Every mutation is followed by a best-effort write of both fields to the
//! storage backend. Storage problems are logged and swallowed; they never
//! reach the caller and never stop startup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ChartStudioError, Result};
use crate::model::{
    ChartOptions, ChartOptionsPatch, DataItem, is_hex_color, seed_data, validate_items,
};
use crate::storage::{DATA_KEY, OPTIONS_KEY, StorageBackend};

/// The persisted unit: data plus options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub data_items: Vec<DataItem>,
    pub chart_options: ChartOptions,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            data_items: seed_data(),
            chart_options: ChartOptions::default(),
        }
    }
}

/// How one field came out of [`StateStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLoad {
    Restored,
    /// Nothing stored under the key; default used
    Missing,
    /// Stored value unreadable or invalid; default used
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub data: FieldLoad,
    pub options: FieldLoad,
}

pub struct StateStore {
    backend: Box<dyn StorageBackend>,
    state: ApplicationState,
}

impl StateStore {
    /// Store holding the built-in defaults; nothing is read yet
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            state: ApplicationState::default(),
        }
    }

    /// Store restored from `backend`
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let mut store = Self::new(backend);
        store.load();
        store
    }

    pub fn data(&self) -> &[DataItem] {
        &self.state.data_items
    }

    pub fn options(&self) -> &ChartOptions {
        &self.state.chart_options
    }

    pub fn snapshot(&self) -> ApplicationState {
        self.state.clone()
    }

    /// Replace the whole dataset. Items that would not survive a reload
    /// (non-finite values, empty or duplicate ids) reject the whole set and
    /// leave the current data untouched.
    pub fn replace_data(&mut self, items: Vec<DataItem>) -> Result<()> {
        validate_items(&items)?;
        debug!("Replacing chart data with {} items", items.len());
        self.state.data_items = items;
        self.persist();
        Ok(())
    }

    /// Shallow merge of `patch` over the current options. Always succeeds; a
    /// color that is not `#rgb`/`#rrggbb` is dropped and the other fields
    /// still apply.
    pub fn replace_options(&mut self, mut patch: ChartOptionsPatch) {
        if patch.color.as_deref().is_some_and(|c| !is_hex_color(c)) {
            warn!("Ignoring invalid chart color {:?}", patch.color.take());
        }
        patch.apply(&mut self.state.chart_options);
        self.persist();
    }

    /// Append a manually entered point with a fresh id
    pub fn add_item(&mut self, name: &str, value: f64) -> Result<&DataItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChartStudioError::validation("item name must not be empty"));
        }
        if !value.is_finite() {
            return Err(ChartStudioError::validation(format!(
                "item '{name}' needs a finite numeric value"
            )));
        }
        self.state.data_items.push(DataItem::new(name, value));
        self.persist();
        self.state
            .data_items
            .last()
            .ok_or_else(|| ChartStudioError::Internal {
                message: "item vanished after insert".into(),
            })
    }

    /// Returns whether an item with `id` existed
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.state.data_items.len();
        self.state.data_items.retain(|item| item.id != id);
        let removed = self.state.data_items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Restore both fields from storage, each on its own. Anything missing,
    /// unreadable or invalid leaves that field at its built-in default.
    pub fn load(&mut self) -> LoadReport {
        let (data_items, data) = self.load_field(DATA_KEY, |items: &Vec<DataItem>| {
            validate_items(items)
        });
        let (chart_options, options) =
            self.load_field(OPTIONS_KEY, |options: &ChartOptions| options.validate());

        self.state = ApplicationState {
            data_items: data_items.unwrap_or_else(seed_data),
            chart_options: chart_options.unwrap_or_default(),
        };
        let report = LoadReport { data, options };
        info!(
            "Loaded chart state (data={:?}, options={:?}, items={})",
            report.data,
            report.options,
            self.state.data_items.len()
        );
        report
    }

    fn load_field<T: DeserializeOwned>(
        &self,
        key: &str,
        check: impl Fn(&T) -> Result<()>,
    ) -> (Option<T>, FieldLoad) {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (None, FieldLoad::Missing),
            Err(e) => {
                warn!("Failed to read '{}' from storage: {}", key, e);
                return (None, FieldLoad::Fallback);
            }
        };
        let value: T = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored '{}' is not decodable, using default: {}", key, e);
                return (None, FieldLoad::Fallback);
            }
        };
        if let Err(e) = check(&value) {
            warn!("Stored '{}' is invalid, using default: {}", key, e);
            return (None, FieldLoad::Fallback);
        }
        (Some(value), FieldLoad::Restored)
    }

    /// Write both fields. Failures are logged, not returned, and not retried.
    pub fn persist(&mut self) {
        let data = serde_json::to_string(&self.state.data_items);
        let options = serde_json::to_string(&self.state.chart_options);
        self.write_field(DATA_KEY, data.map_err(ChartStudioError::from));
        self.write_field(OPTIONS_KEY, options.map_err(ChartStudioError::from));
    }

    fn write_field(&mut self, key: &str, encoded: Result<String>) {
        let outcome = encoded.and_then(|json| self.backend.set(key, &json));
        if let Err(e) = outcome {
            warn!(
                category = %e.category(),
                "Failed to save '{}' to storage: {}",
                key,
                e
            );
        }
    }
}
