//! Key-value storage behind the bridge secret
//!
//! The secret store only needs three operations from its medium, so every
//! backend (memory, JSON file, OS keychain) implements this small trait.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors raised by a storage backend
///
/// These are propagated to the caller as-is; nothing in this crate retries
/// or swallows a storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Keyring operation failed
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file is not a JSON object of strings
    #[error("Invalid store format: {0}")]
    Format(#[from] serde_json::Error),

    /// A previous holder of the store lock panicked
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Persistent string-to-string storage
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
