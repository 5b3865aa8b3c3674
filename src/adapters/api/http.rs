//! reqwest-backed implementation of [`BiobankApi`]

use super::traits::{unwrap_envelope, BiobankApi, Query};
use crate::config::{ApiConfig, SecretString};
use crate::domain::errors::{ApiError, BiobankError};
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// HTTP client for the biobank REST API
///
/// Paths passed to the trait methods are joined onto the configured base
/// URL, so `"/shipments/s1"` with a base of `https://host/api` requests
/// `https://host/api/shipments/s1`.
///
/// Requests are never retried. A failed write is reported to the caller,
/// who decides whether to reload the entity.
pub struct HttpApi {
    base_url: String,
    client: Client,
    auth_token: Option<SecretString>,
}

impl HttpApi {
    /// Create a new client from API configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is not an absolute
    /// `http`/`https` URL or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|e| {
            BiobankError::Configuration(format!("invalid api.base_url '{}': {e}", config.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BiobankError::Configuration(format!(
                "api.base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the biobank API");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| BiobankError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Returns the base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, method: &'static str, path: &str, request: RequestBuilder) -> Result<Value> {
        tracing::debug!(method = method, path = %path, "Sending request to biobank API");

        let resp = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(format!("{method} {path}: {e}"))
            } else {
                ApiError::ConnectionFailed(format!("{method} {path}: {e}"))
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = error_message(&body);
            tracing::debug!(
                method = method,
                path = %path,
                status = status.as_u16(),
                message = %message,
                "Biobank API rejected request"
            );
            return Err(status_error(status, message).into());
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let reply: Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{method} {path}: {e}")))?;

        Ok(unwrap_envelope(reply)?)
    }
}

#[async_trait]
impl BiobankApi for HttpApi {
    async fn get(&self, path: &str, query: &Query) -> Result<Value> {
        let request = self.client.get(self.url(path)).query(query);
        self.send("GET", path, request).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let request = self.client.post(self.url(path)).json(&body);
        self.send("POST", path, request).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        let request = self.client.delete(self.url(path));
        self.send("DELETE", path, request).await
    }
}

/// Pulls the server's message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn status_error(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::CONFLICT => ApiError::Conflict(message),
        s if s.is_client_error() => ApiError::ClientError {
            status: s.as_u16(),
            message,
        },
        s => ApiError::ServerError {
            status: s.as_u16(),
            message,
        },
    }
}
