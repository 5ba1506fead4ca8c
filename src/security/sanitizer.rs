//! Redaction helpers for log output
//!
//! Request URLs may carry tokens in their query string, which is dropped
//! before a URL is logged.

/// Sanitizer for values that end up in tracing events
pub struct Sanitizer;

impl Sanitizer {
    /// Drops the query string and fragment from a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use bridge_auth::security::Sanitizer;
    ///
    /// assert_eq!(
    ///     Sanitizer::sanitize_url("http://bridge.local/api/loads?token=x#top"),
    ///     "http://bridge.local/api/loads"
    /// );
    /// ```
    pub fn sanitize_url(url: &str) -> String {
        url.split(['?', '#']).next().unwrap_or(url).to_string()
    }
}
