//! Authentication module - secret storage and credential prompts
//!
//! Provides:
//! - A `KeyValueStore` trait with memory, JSON file and OS keychain backends
//! - `SecretStore`, the get/set/clear accessor for the bridge secret
//! - `CredentialPrompt`, the notice and input prompt used during recovery

mod file_store;
mod prompt;
mod secret;
mod secure_store;
mod store;

pub use file_store::FileStore;
pub use prompt::{
    CredentialPrompt, NonInteractivePrompt, PromptError, TerminalPrompt, REJECTED_NOTICE,
    SECRET_PROMPT,
};
pub use secret::{SecretStore, DEFAULT_STORAGE_KEY};
pub use secure_store::{KeyringStore, DEFAULT_SERVICE};
pub use store::{KeyValueStore, MemoryStore, StoreError};

#[cfg(test)]
pub use prompt::MockCredentialPrompt;
