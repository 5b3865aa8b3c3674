//! Biobank REST API adapter
//!
//! This module provides the [`BiobankApi`] trait the domain layer talks to
//! and the reqwest-backed [`HttpApi`] implementation.

pub mod http;
pub mod traits;

pub use http::HttpApi;
pub use traits::{unwrap_envelope, BiobankApi, Query};
