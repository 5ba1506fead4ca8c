//! Configuration management for bridge-auth
//!
//! Selects where the secret is persisted and how it is sent. Settings live in
//! a JSON file in the platform config directory; every field has a default so
//! a missing or partial file is fine.

use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{
    CredentialPrompt, FileStore, KeyValueStore, KeyringStore, MemoryStore, SecretStore,
    DEFAULT_SERVICE, DEFAULT_STORAGE_KEY,
};
use crate::interceptor::{SecretInterceptor, SECRET_HEADER};
use crate::transport::ReqwestTransport;

/// Client type produced by [`BridgeConfig::build_client`]
pub type BridgeClient = SecretInterceptor<ReqwestTransport>;

/// Errors that can occur while loading or applying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// No platform config directory could be determined
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// `secret_header` is not a valid header name
    #[error("Invalid secret header name: {0}")]
    InvalidHeader(String),

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Where the secret is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; gone when the process exits
    Memory,
    /// JSON file on disk
    #[default]
    File,
    /// OS keychain
    Keyring,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Storage backend for the secret
    pub store: StoreBackend,
    /// File backend location; defaults to `secrets.json` in the config dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Keychain service name for the keyring backend
    pub service: String,
    /// Key the secret is stored under
    pub storage_key: String,
    /// Header the secret is sent in
    pub secret_header: String,
    /// Timeout applied to requests that do not set their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            store_path: None,
            service: DEFAULT_SERVICE.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            secret_header: SECRET_HEADER.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl BridgeConfig {
    /// Gets the config directory path (cross-platform)
    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|p| PathBuf::from(p).join("bridge-auth"))
        }

        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|p| PathBuf::from(p).join("Library/Application Support/bridge-auth"))
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
                .map(|p| p.join("bridge-auth"))
        }
    }

    /// Gets the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Loads configuration from the default location
    ///
    /// A missing file (or missing config dir) yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Saves configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the file backend location
    pub fn resolved_store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Self::config_dir()
                .map(|dir| dir.join("secrets.json"))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Returns the secret header as a typed header name
    pub fn header_name(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::from_bytes(self.secret_header.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(self.secret_header.clone()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Builds the configured storage backend
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        let store: Arc<dyn KeyValueStore> = match self.store {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File => Arc::new(FileStore::new(self.resolved_store_path()?)),
            StoreBackend::Keyring => Arc::new(KeyringStore::with_service(self.service.clone())),
        };
        Ok(store)
    }

    /// Builds the secret accessor over the configured backend
    pub fn secret_store(&self) -> Result<SecretStore, ConfigError> {
        Ok(SecretStore::with_key(self.open_store()?, self.storage_key.clone()))
    }

    /// Builds an intercepting HTTP client from this configuration
    pub fn build_client(
        &self,
        prompt: Arc<dyn CredentialPrompt>,
    ) -> Result<BridgeClient, ConfigError> {
        let mut transport = ReqwestTransport::with_client(reqwest::Client::builder().build()?);
        if let Some(timeout) = self.request_timeout() {
            transport = transport.with_default_timeout(timeout);
        }
        Ok(SecretInterceptor::new(transport, self.secret_store()?, prompt)
            .with_header_name(self.header_name()?))
    }
}
