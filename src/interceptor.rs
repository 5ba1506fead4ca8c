//! Secret-injecting transport wrapper
//!
//! [`SecretInterceptor`] decorates another [`Transport`]. Every request it
//! forwards carries the stored secret in `X-Bridge-Secret`, and a body sent
//! without a content type gets `application/json`.
//!
//! # Recovery
//!
//! ```text
//! dispatch ──(status != 401)──────────────────────────────► return response
//!    │
//!    └─(401)─► clear secret + notice (if one was sent)
//!              prompt ──(cancel)──────────────────────────► return the 401
//!                 │
//!                 └─(new secret)─► store it, dispatch again ► return response
//! ```
//!
//! The second dispatch is terminal whatever its status. Transport errors are
//! returned as they are and never trigger recovery. Concurrent requests that
//! hit a 401 each run their own recovery; prompts are not coalesced.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use std::sync::Arc;

use crate::auth::{CredentialPrompt, SecretStore};
use crate::security::{Sanitizer, SecureString};
use crate::transport::{FetchError, Request, Response, Transport};

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "x-bridge-secret";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Transport wrapper that attaches the bridge secret and re-prompts once on 401
pub struct SecretInterceptor<T> {
    inner: T,
    secrets: SecretStore,
    prompt: Arc<dyn CredentialPrompt>,
    header: HeaderName,
}

impl<T: Transport> SecretInterceptor<T> {
    /// Wraps `inner`, reading the secret from `secrets` and asking `prompt`
    /// for a replacement when it is rejected
    pub fn new(inner: T, secrets: SecretStore, prompt: Arc<dyn CredentialPrompt>) -> Self {
        Self {
            inner,
            secrets,
            prompt,
            header: HeaderName::from_static(SECRET_HEADER),
        }
    }

    /// Sends the secret under a different header name
    pub fn with_header_name(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    /// Returns the secret store, for tooling that manages the secret directly
    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    /// Returns the wrapped transport
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Performs `request` without taking ownership of it
    ///
    /// The caller's request is never modified; each dispatch works on a
    /// fresh copy built by [`SecretInterceptor::prepare`].
    pub async fn execute(&self, request: &Request) -> Result<Response, FetchError> {
        let (response, secret_sent) = self.dispatch(request).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        if !self.recover(secret_sent).await? {
            tracing::debug!("No replacement secret given, returning 401");
            return Ok(response);
        }

        tracing::info!(
            url = %Sanitizer::sanitize_url(&request.target),
            "Retrying request with new bridge secret"
        );
        let (retried, _) = self.dispatch(request).await?;
        Ok(retried)
    }

    /// Builds the augmented copy of `request` for one dispatch
    ///
    /// Returns the copy and whether a stored secret was attached to it.
    pub fn prepare(&self, request: &Request) -> Result<(Request, bool), FetchError> {
        let mut prepared = request.clone();

        let secret_sent = match self.secrets.get()? {
            Some(secret) => {
                prepared
                    .headers
                    .insert(self.header.clone(), secret_header_value(&secret)?);
                true
            }
            None => false,
        };

        let needs_json_default = prepared.body.as_ref().is_some_and(|body| !body.is_multipart())
            && prepared.effective_method() != "GET"
            && !prepared.headers.contains_key(CONTENT_TYPE);
        if needs_json_default {
            prepared
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }

        Ok((prepared, secret_sent))
    }

    async fn dispatch(&self, request: &Request) -> Result<(Response, bool), FetchError> {
        let (prepared, secret_sent) = self.prepare(request)?;

        tracing::debug!(
            method = %prepared.effective_method(),
            url = %Sanitizer::sanitize_url(&prepared.target),
            secret_sent,
            "Dispatching request"
        );

        let response = self.inner.send(prepared).await?;
        Ok((response, secret_sent))
    }

    /// Runs the clear/notify/prompt steps after a 401
    ///
    /// Returns true if a new secret was stored and the request should be
    /// sent once more.
    async fn recover(&self, secret_sent: bool) -> Result<bool, FetchError> {
        if secret_sent {
            tracing::warn!("Bridge secret rejected by server, clearing it");
            self.secrets.clear()?;
            self.prompt.notify_rejected().await?;
        }

        let entered = match self.prompt.request_secret().await? {
            Some(answer) => SecureString::new(answer),
            None => return Ok(false),
        };
        if entered.trim().is_empty() {
            return Ok(false);
        }

        self.secrets.set(&entered)?;
        tracing::debug!(len = entered.trim().len(), "Stored new bridge secret");
        Ok(true)
    }
}

fn secret_header_value(secret: &SecureString) -> Result<HeaderValue, FetchError> {
    let mut value = HeaderValue::from_str(secret.as_str()).map_err(|_| {
        FetchError::InvalidRequest("stored bridge secret is not a valid header value".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl<T: Transport> Transport for SecretInterceptor<T> {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        self.execute(&request).await
    }
}
