//! Durable key/value storage for chart state.
//!
//! Values are JSON strings. Only the state store reads or writes the two
//! reserved keys below.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ChartStudioError, Result};

pub const DATA_KEY: &str = "chartData";
pub const OPTIONS_KEY: &str = "chartOptions";

pub trait StorageBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ChartStudioError::InvalidParams {
                message: format!("invalid storage key '{key}'"),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChartStudioError::Persistence {
                message: format!("read {}: {}", path.display(), e),
            }),
        }
    }

    /// Write to a sibling temp file, then rename over the target
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| ChartStudioError::Persistence {
            message: format!("create {}: {}", self.dir.display(), e),
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| ChartStudioError::Persistence {
            message: format!("write {}: {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| ChartStudioError::Persistence {
            message: format!("rename {} -> {}: {}", tmp.display(), path.display(), e),
        })?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage. Clones share the same entries, so a caller can keep a
/// handle after giving one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    unreadable: Arc<Mutex<HashSet<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail, as a full or read-only store would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `get` on `key` fail, as an unreadable entry would
    pub fn set_fail_reads(&self, key: &str, fail: bool) {
        if let Ok(mut unreadable) = self.unreadable.lock() {
            if fail {
                unreadable.insert(key.to_string());
            } else {
                unreadable.remove(key);
            }
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| ChartStudioError::Persistence {
            message: "memory storage lock poisoned".into(),
        })
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let unreadable = self
            .unreadable
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(true);
        if unreadable {
            return Err(ChartStudioError::Persistence {
                message: format!("read of '{key}' refused"),
            });
        }
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChartStudioError::Persistence {
                message: format!("write to '{key}' refused"),
            });
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
