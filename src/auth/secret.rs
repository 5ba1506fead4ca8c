//! The bridge secret accessor
//!
//! Wraps a [`KeyValueStore`] and exposes get/set/clear for the single named
//! secret. Empty or whitespace-only values are never persisted: setting one
//! removes the entry, and reading one back yields `None`.

use std::sync::Arc;

use super::store::{KeyValueStore, StoreError};
use crate::security::SecureString;

/// Key the secret is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "bridge_secret";

/// Accessor for the one shared secret of a session
#[derive(Clone)]
pub struct SecretStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl SecretStore {
    /// Creates a secret store over `backend` using the default key
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    /// Creates a secret store over `backend` using a custom key
    pub fn with_key(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Returns the storage key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the persisted secret, or `None` if none is stored
    pub fn get(&self) -> Result<Option<SecureString>, StoreError> {
        let raw = self.backend.get(&self.key)?;
        Ok(raw.and_then(|value| {
            let value = SecureString::new(value);
            SecureString::normalized(&value)
        }))
    }

    /// Returns the persisted secret, or an empty string if none is stored
    pub fn get_or_empty(&self) -> Result<String, StoreError> {
        Ok(self.get()?.map(SecureString::into_inner).unwrap_or_default())
    }

    /// Persists the trimmed `value`, or removes the entry if it is blank
    pub fn set(&self, value: &str) -> Result<(), StoreError> {
        match SecureString::normalized(value) {
            Some(secret) => self.backend.set(&self.key, secret.as_str()),
            None => self.backend.remove(&self.key),
        }
    }

    /// Removes the persisted secret
    pub fn clear(&self) -> Result<(), StoreError> {
        self.set("")
    }

    /// Returns true if a secret is currently stored
    pub fn is_set(&self) -> Result<bool, StoreError> {
        Ok(self.get()?.is_some())
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore").field("key", &self.key).finish()
    }
}
