//! OS keychain storage
//!
//! Stores each key as its own credential entry using the platform keychain
//! (Windows Credential Manager, macOS Keychain, Secret Service on Linux),
//! accessed via the keyring crate.

use keyring::Entry;

use super::store::{KeyValueStore, StoreError};

/// Default keychain service name
pub const DEFAULT_SERVICE: &str = "bridge-auth";

/// Keychain-backed store
///
/// # Example
///
/// ```no_run
/// use bridge_auth::auth::{KeyValueStore, KeyringStore};
///
/// let store = KeyringStore::new();
/// store.set("bridge_secret", "my-secret").unwrap();
/// assert_eq!(store.get("bridge_secret").unwrap(), Some("my-secret".to_string()));
/// store.remove("bridge_secret").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Creates a store under the default service name
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Creates a store under a custom service name
    ///
    /// Useful for testing or for running several bridges side by side.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the service name used for this store
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Keyring(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Keyring(e)),
        }
    }
}
