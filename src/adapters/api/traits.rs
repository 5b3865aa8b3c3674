//! Biobank REST API trait definition
//!
//! Every network-bound domain operation receives a `&dyn BiobankApi`. The
//! trait hides the transport so that entities can be exercised against an
//! in-memory fake in tests and against [`HttpApi`](super::HttpApi) in
//! production.

use crate::domain::errors::ApiError;
use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Query parameters sent with a GET request
pub type Query = Vec<(String, String)>;

/// Trait for talking to the biobank server
///
/// Implementations return the reply *payload*: when the server wraps its
/// answer in a `{ "status": "success", "data": ... }` envelope the adapter
/// unwraps it before handing it to the caller.
///
/// # Example
///
/// ```no_run
/// use biobank::adapters::api::{BiobankApi, HttpApi};
/// use biobank::config::ApiConfig;
///
/// # async fn example() -> biobank::domain::Result<()> {
/// let api = HttpApi::new(&ApiConfig::default())?;
/// let reply = api.get("/studies/names", &Vec::new()).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BiobankApi: Send + Sync {
    /// Issues a GET request
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] wrapped in [`BiobankError::Api`](crate::domain::BiobankError::Api)
    /// if the request fails or the server rejects it.
    async fn get(&self, path: &str, query: &Query) -> Result<Value>;

    /// Issues a POST request with a JSON body
    async fn post(&self, path: &str, body: Value) -> Result<Value>;

    /// Issues a DELETE request
    async fn delete(&self, path: &str) -> Result<Value>;
}

/// Strips the server's reply envelope
///
/// Replies without a `status` member are returned unchanged.
///
/// # Errors
///
/// Returns [`ApiError::ErrorEnvelope`] carrying the server's message when
/// the envelope reports `"status": "error"`.
pub fn unwrap_envelope(reply: Value) -> std::result::Result<Value, ApiError> {
    let Value::Object(mut map) = reply else {
        return Ok(reply);
    };

    match map.get("status").and_then(Value::as_str) {
        Some("success") => Ok(map.remove("data").unwrap_or(Value::Null)),
        Some("error") => {
            let message = map
                .get("message")
                .map(|m| match m {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "server reported an error".to_string());
            Err(ApiError::ErrorEnvelope(message))
        }
        _ => Ok(Value::Object(map)),
    }
}
