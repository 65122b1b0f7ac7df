//! Persistence for overlay state.
//!
//! Engines never talk to a concrete medium. They receive a [`KvStore`]
//! (string keys, JSON string values) and go through [`load_json`] /
//! [`save_json`], which swallow and log failures so the overlay keeps
//! running in memory when the medium is unavailable.

mod config;
pub mod database;

pub use config::{CanvasConfig, ChatConfig, Config, StorageBackend, StorageConfig, TimerConfig};
pub use database::Database;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StorageError};

/// Minimal key-value contract the overlay engines persist through.
///
/// Writes must be durable by the time `set`/`remove` return; there is no
/// write queue.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store. Used by tests and by `--memory` runs of the CLI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// A store whose medium is gone. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KvStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("no backing medium".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no backing medium".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no backing medium".into()))
    }
}

/// Read and decode a JSON value. Missing keys, unreadable media and
/// undecodable values all come back as `None`; the latter two are logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed, using in-memory state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(source) => {
            let e = StorageError::Codec {
                key: key.to_string(),
                source,
            };
            tracing::warn!(key, error = %e, "discarding undecodable stored value");
            None
        }
    }
}

/// Encode and write a JSON value. Returns whether the write reached the medium.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> bool {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(source) => {
            let e = StorageError::Codec {
                key: key.to_string(),
                source,
            };
            tracing::warn!(key, error = %e, "could not encode value for storage");
            return false;
        }
    };
    match store.set(key, &encoded) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage write failed, continuing in memory");
            false
        }
    }
}

/// Delete a key, logging failures.
pub fn remove_key(store: &dyn KvStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage delete failed, continuing in memory");
            false
        }
    }
}

/// Returns the data directory for config and database files.
///
/// `OVERLAYROOM_DATA_DIR` wins outright. Otherwise `~/.config/overlayroom[-dev]/`,
/// with `OVERLAYROOM_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("OVERLAYROOM_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("OVERLAYROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("overlayroom-dev")
            } else {
                base_dir.join("overlayroom")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        left: i32,
        top: i32,
    }

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn json_helpers_roundtrip_through_store() {
        let store = MemoryStore::new();
        assert!(save_json(&store, "pos", &Sample { left: 3, top: 4 }));
        let back: Option<Sample> = load_json(&store, "pos");
        assert_eq!(back, Some(Sample { left: 3, top: 4 }));
    }

    #[test]
    fn undecodable_value_loads_as_none() {
        let store = MemoryStore::new();
        store.set("pos", "{not json").unwrap();
        let back: Option<Sample> = load_json(&store, "pos");
        assert!(back.is_none());
    }

    #[test]
    fn unavailable_store_is_swallowed() {
        let store = UnavailableStore;
        assert!(!save_json(&store, "pos", &Sample { left: 0, top: 0 }));
        assert!(load_json::<Sample>(&store, "pos").is_none());
        assert!(!remove_key(&store, "pos"));
    }
}
