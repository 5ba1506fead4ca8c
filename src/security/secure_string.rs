//! Zeroizing string for holding the bridge secret in memory
//!
//! The secret lives in a `SecureString` between the moment it is read from
//! the store and the moment it is copied into an outbound header. The buffer
//! is wiped on drop and never shows up in `Debug` output.

use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// A string that clears its memory when dropped
///
/// # Example
///
/// ```
/// use bridge_auth::security::SecureString;
///
/// let secret = SecureString::new("s3cr3t".to_string());
/// assert_eq!(secret.as_str(), "s3cr3t");
/// assert!(!format!("{:?}", secret).contains("s3cr3t"));
/// ```
#[derive(Clone)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Wraps an owned String without copying it
    pub fn new(s: String) -> Self {
        Self { inner: s }
    }

    /// Trims surrounding whitespace and wraps the remainder
    ///
    /// Returns `None` when nothing is left, which is how an empty or
    /// whitespace-only secret collapses to "no secret".
    pub fn normalized(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::new(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Consumes the wrapper and hands back a plain String
    ///
    /// The returned String is not zeroed on drop.
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.inner)
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

// No Display impl: the secret must be asked for explicitly via as_str()
impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .field("content", &"[REDACTED]")
            .finish()
    }
}
