//! Security module - secret handling in memory and in logs
//!
//! - `SecureString` keeps the bridge secret in a zeroizing buffer
//! - `Sanitizer` strips query strings from URLs before they reach a log line

mod sanitizer;
mod secure_string;

pub use sanitizer::Sanitizer;
pub use secure_string::SecureString;
