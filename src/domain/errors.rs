//! Domain error types
//!
//! This module defines the error hierarchy for the biobank client.
//! Errors are domain-specific and don't expose third-party types: the HTTP
//! client's errors are flattened into [`ApiError`] at the adapter boundary.

use thiserror::Error;

/// Main biobank error type
///
/// This is the primary error type used throughout the crate. Client-side
/// precondition failures are [`BiobankError::Domain`], malformed entity data is
/// [`BiobankError::InvalidServerObject`], and anything the server or the
/// network rejected is carried unchanged in [`BiobankError::Api`].
#[derive(Debug, Error)]
pub enum BiobankError {
    /// A plain object failed schema validation or could not be decoded
    #[error("invalid object from server: {0}")]
    InvalidServerObject(String),

    /// One or more items of a list reply failed validation
    #[error("invalid {0} from server")]
    InvalidServerList(String),

    /// A client-side guard rejected the operation before any request was made
    #[error("{0}")]
    Domain(String),

    /// The REST API rejected the request or could not be reached
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl BiobankError {
    /// Shorthand for a client-side precondition failure
    pub fn domain(message: impl Into<String>) -> Self {
        BiobankError::Domain(message.into())
    }

    /// Returns true if the server rejected a write because of a stale version
    pub fn is_conflict(&self) -> bool {
        matches!(self, BiobankError::Api(ApiError::Conflict(_)))
    }
}

/// REST API errors
///
/// Errors that occur when talking to the biobank server. Status codes are
/// classified but not interpreted; session handling belongs to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to connect to the server
    #[error("Failed to connect to server: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Server refused a write made against a stale version (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Server replied with a `{ "status": "error" }` envelope
    #[error("{0}")]
    ErrorEnvelope(String),

    /// Reply body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for BiobankError {
    fn from(err: std::io::Error) -> Self {
        BiobankError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BiobankError {
    fn from(err: serde_json::Error) -> Self {
        BiobankError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BiobankError {
    fn from(err: toml::de::Error) -> Self {
        BiobankError::Configuration(format!("TOML parse error: {err}"))
    }
}
