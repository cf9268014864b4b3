//! Local persisted watch-state storage.
//!
//! [`StateStore`] is a namespaced key-value surface over a single JSON
//! document on disk. The watchedlist uses a handful of logical keys per
//! media kind (watched records, progress fractions, progress snapshots)
//! and always writes whole values; there is no partial-update or merge
//! semantics, the last writer wins.
//!
//! The document is loaded once at open and written through synchronously
//! on every `set`, so a mutating watchedlist call observes its own write
//! immediately. A missing or unreadable document initializes to empty:
//! everything in here is re-derivable from a successful remote refresh.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;

/// File name of the persisted watch-state document.
pub const STORE_FILE: &str = "watch_state.json";

/// Namespaced key-value persistence for watch state.
///
/// Shared process-wide behind an `Arc`; one instance serves every media
/// kind through distinct namespaces.
#[derive(Debug)]
pub struct StateStore {
    /// Document path. `None` means in-memory only (tests).
    path: Option<PathBuf>,
    /// Full document, keyed by `namespace + key`.
    data: RwLock<HashMap<String, Value>>,
}

impl StateStore {
    /// Open the store document at `path`, creating parent directories as
    /// needed.
    ///
    /// A document that is missing, unreadable, or fails to parse starts
    /// the store off empty rather than failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let data = Self::load_or_default(&path);
        info!(
            "Watch-state store opened at {} with {} entries",
            path.display(),
            data.len()
        );

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Open the store at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Self::open(default_data_directory().join(STORE_FILE))
    }

    /// Create a store that never touches disk. Intended for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn load_or_default(path: &Path) -> HashMap<String, Value> {
        if !path.exists() {
            return HashMap::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read watch-state store, starting empty: {e}");
                return HashMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to parse watch-state store, starting empty: {e}");
                HashMap::new()
            }
        }
    }

    /// Read the value stored under `namespace` + `key`.
    ///
    /// Returns `None` when the key is absent or the stored value does not
    /// decode as `T` (a stale schema reads as fresh state).
    pub fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let value = data.get(&compose_key(namespace, key))?.clone();
        drop(data);

        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Discarding undecodable value for {namespace}{key}: {e}");
                None
            }
        }
    }

    /// Replace the value stored under `namespace` + `key` and persist the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the document
    /// cannot be written.
    pub fn set<T: Serialize>(&self, namespace: &str, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;

        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(compose_key(namespace, key), value);
        let result = self.persist(&data);
        drop(data);

        result
    }

    /// Serialize the whole document to disk. Called with the write lock
    /// held so concurrent writers cannot interleave stale documents.
    fn persist(&self, data: &HashMap<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(data)?;
        fs::write(path, content)?;
        debug!("Persisted watch-state store ({} entries)", data.len());
        Ok(())
    }
}

/// Default platform-specific data directory for the store document.
#[must_use]
pub fn default_data_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("reeldeck")
}

fn compose_key(namespace: &str, key: &str) -> String {
    format!("{namespace}{key}")
}
