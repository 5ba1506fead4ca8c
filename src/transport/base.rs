//! Base types and traits for transports
//!
//! A transport takes a [`Request`] descriptor and produces a fully read
//! [`Response`]. The interceptor implements the same trait around another
//! transport, so callers never need to know whether they hold the plain
//! client or the secret-injecting wrapper.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{PromptError, StoreError};

/// Errors that can occur while performing a request
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, timeout, reading the body)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request descriptor cannot be sent as-is
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing the stored secret failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Showing a prompt or reading the answer failed
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
}

/// One named field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File upload
    File { file_name: String, bytes: Vec<u8> },
}

/// Multipart form payload
///
/// The transport generates the boundary-bearing content type for this body,
/// so the interceptor never adds one of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultipartForm {
    pub parts: Vec<(String, FormValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormValue::Text(value.into())));
        self
    }

    /// Adds a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormValue::File {
                file_name: file_name.into(),
                bytes: bytes.into(),
            },
        ));
        self
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// An explicitly empty body; still counts as "a body was given"
    Empty,
    Text(String),
    Bytes(Vec<u8>),
    Multipart(MultipartForm),
}

impl Body {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Body::Multipart(_))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<MultipartForm> for Body {
    fn from(form: MultipartForm) -> Self {
        Body::Multipart(form)
    }
}

/// Describes one outbound request
///
/// `method` is kept as the caller wrote it; [`Request::effective_method`]
/// applies the GET default and uppercasing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    /// Target URL
    pub target: String,
    /// Method as given by the caller, if any
    pub method: Option<String>,
    /// Caller-supplied headers
    pub headers: HeaderMap,
    /// Payload; `Some` even when empty means a body was given
    pub body: Option<Body>,
    /// Per-request timeout, passed through to the transport
    pub timeout: Option<Duration>,
}

impl Request {
    /// Creates a request with no method, headers or body
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Creates a GET request
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(target).with_method("GET")
    }

    /// Creates a POST request
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(target).with_method("POST")
    }

    /// Sets the method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Adds a header, replacing any previous value for the same name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the method to send: the explicit one uppercased, else GET
    pub fn effective_method(&self) -> String {
        self.method
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "GET".to_string())
    }
}

/// A fully received response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Sets the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the server rejected the secret
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Returns the body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Anything that can perform a request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request and reads the full response
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;

    #[test]
    fn test_effective_method_defaults_to_get() {
        assert_eq!(Request::new("http://bridge.local/").effective_method(), "GET");
    }

    #[test]
    fn test_effective_method_uppercases() {
        let request = Request::new("http://bridge.local/").with_method("patch");
        assert_eq!(request.effective_method(), "PATCH");
        assert_eq!(request.method.as_deref(), Some("patch"));
    }

    #[test]
    fn test_request_builder() {
        let request = Request::post("http://bridge.local/api/loads/1")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body("level=50")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(request.target, "http://bridge.local/api/loads/1");
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(request.body, Some(Body::Text("level=50".into())));
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_body_kinds() {
        assert!(Body::from(MultipartForm::new().text("a", "b")).is_multipart());
        assert!(!Body::Empty.is_multipart());
        assert!(!Body::from(vec![1u8, 2, 3]).is_multipart());
    }

    #[test]
    fn test_multipart_builder() {
        let form = MultipartForm::new()
            .text("name", "kitchen")
            .file("config", "config.json", b"{}".to_vec());

        assert_eq!(form.parts.len(), 2);
        assert_eq!(
            form.parts[0],
            ("name".to_string(), FormValue::Text("kitchen".to_string()))
        );
        assert!(matches!(&form.parts[1].1, FormValue::File { file_name, .. } if file_name == "config.json"));
    }

    #[test]
    fn test_response_helpers() {
        let response = Response::new(StatusCode::OK).with_body(r#"{"level":75}"#);
        assert!(response.is_success());
        assert!(!response.is_unauthorized());
        assert_eq!(response.text(), r#"{"level":75}"#);

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["level"], 75);

        assert!(Response::new(StatusCode::UNAUTHORIZED).is_unauthorized());
        assert!(!Response::new(StatusCode::FORBIDDEN).is_unauthorized());
    }
}
