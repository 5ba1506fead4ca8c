//! Transport module - the request/response seam
//!
//! Defines the `Transport` trait, the request descriptor and response types,
//! and the reqwest-backed implementation used outside of tests.

mod base;
mod http;

pub use base::*;
pub use http::ReqwestTransport;
