//! bridge-auth - shared-secret request interception
//!
//! Attaches a stored shared secret to every outbound request and, when the
//! server answers 401, asks the user for a new secret and retries once.
//!
//! ## Architecture
//!
//! - **Transport**: the `send(request) -> response` seam, with a reqwest
//!   implementation
//! - **Interceptor**: a `Transport` that wraps another one, injects the
//!   `X-Bridge-Secret` header and runs the one-shot recovery on 401
//! - **Auth**: the secret store, its storage backends, and the prompts used
//!   during recovery
//! - **Security**: zeroizing secret buffers and log redaction
//! - **Config**: JSON settings selecting the backend and header
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bridge_auth::auth::{MemoryStore, SecretStore, TerminalPrompt};
//! use bridge_auth::transport::{ReqwestTransport, Request};
//! use bridge_auth::SecretInterceptor;
//!
//! # async fn run() -> Result<(), bridge_auth::transport::FetchError> {
//! let secrets = SecretStore::new(Arc::new(MemoryStore::new()));
//! secrets.set("my-secret")?;
//!
//! let client = SecretInterceptor::new(
//!     ReqwestTransport::new(),
//!     secrets,
//!     Arc::new(TerminalPrompt::new()),
//! );
//! let response = client.execute(&Request::get("http://bridge.local/api/status")).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod interceptor;
pub mod security;
pub mod transport;

pub use auth::{CredentialPrompt, SecretStore};
pub use config::{BridgeClient, BridgeConfig};
pub use interceptor::{SecretInterceptor, SECRET_HEADER};
pub use transport::{FetchError, Request, Response, Transport};
