//! reqwest-backed transport
//!
//! Maps a [`Request`] descriptor onto a `reqwest::Client` call and reads the
//! whole response body.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use std::time::Duration;

use super::base::{Body, FetchError, FormValue, MultipartForm, Request, Response, Transport};
use crate::security::Sanitizer;

/// Transport performing real HTTP requests
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport with a default client
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            default_timeout: None,
        }
    }

    /// Applies `timeout` to requests that do not carry their own
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn into_form(form: MultipartForm) -> Form {
    form.parts
        .into_iter()
        .fold(Form::new(), |acc, (name, value)| match value {
            FormValue::Text(text) => acc.text(name, text),
            FormValue::File { file_name, bytes } => {
                acc.part(name, Part::bytes(bytes).file_name(file_name))
            }
        })
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let method_name = request.effective_method();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| FetchError::InvalidRequest(format!("invalid method: {}", method_name)))?;

        tracing::debug!(
            method = %method,
            url = %Sanitizer::sanitize_url(&request.target),
            "Sending request"
        );

        let mut builder = self
            .client
            .request(method, request.target.as_str())
            .headers(request.headers);

        if let Some(timeout) = request.timeout.or(self.default_timeout) {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            None => builder,
            Some(Body::Empty) => builder.body(Vec::<u8>::new()),
            Some(Body::Text(text)) => builder.body(text),
            Some(Body::Bytes(bytes)) => builder.body(bytes),
            Some(Body::Multipart(form)) => builder.multipart(into_form(form)),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(status = %status, bytes = body.len(), "Received response");

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
