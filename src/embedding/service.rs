//! Embedding sidecar service client.
//!
//! The sidecar runs next to the vector store and exposes a minimal
//! contract: `POST /embed` with exactly one of `text` or `texts`, and
//! `GET /health` reporting the active model. A request with neither field
//! is a client error; this client makes that shape unrepresentable and
//! rejects empty batches before any network call.

use super::Embedder;
use crate::transport::{HttpConfig, RetryPolicy, build_http_client};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default request timeout for the sidecar, which may embed large batches.
const SERVICE_TIMEOUT_MS: u64 = 60_000;

/// Client for the embedding sidecar service.
pub struct EmbedServiceClient {
    /// Service base URL.
    base_url: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Retry policy for transport failures.
    retry: RetryPolicy,
}

impl EmbedServiceClient {
    /// Creates a new client for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: build_http_client(HttpConfig::default().with_timeout_ms(SERVICE_TIMEOUT_MS)),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a client from configuration.
    #[must_use]
    pub fn from_config(config: &crate::MemoryConfig) -> Self {
        Self {
            base_url: config.embed_service_url.clone(),
            client: build_http_client(config.http.with_timeout_ms(SERVICE_TIMEOUT_MS)),
            retry: config.retry,
        }
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Probes the service health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or unhealthy.
    pub fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .map_err(|e| transport_error("embed_service_health", &e))?;

        if !response.status().is_success() {
            return Err(Error::OperationFailed {
                operation: "embed_service_health".to_string(),
                cause: format!("service returned status: {}", response.status()),
            });
        }

        response.json().map_err(|e| Error::OperationFailed {
            operation: "embed_service_health".to_string(),
            cause: e.to_string(),
        })
    }

    fn post_embed(&self, request: &EmbedRequest<'_>) -> Result<EmbedResponse> {
        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(request)
            .send()
            .map_err(|e| transport_error("embed_service_embed", &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "embed-service",
                status = %status,
                body = %body,
                "embedding service returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "embed_service_embed".to_string(),
                cause: format!("service returned status: {status} - {body}"),
            });
        }

        response.json().map_err(|e| Error::OperationFailed {
            operation: "embed_service_embed".to_string(),
            cause: e.to_string(),
        })
    }
}

impl Embedder for EmbedServiceClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::InvalidInput("text to embed is empty".to_string()));
        }

        let request = EmbedRequest {
            text: Some(text),
            texts: None,
        };
        let response = self
            .retry
            .run("embed_service_embed", || self.post_embed(&request))?;

        match response.embedding {
            Some(embedding) if !embedding.is_empty() => Ok(embedding),
            _ => Err(Error::OperationFailed {
                operation: "embed_service_embed".to_string(),
                cause: "service returned no embedding".to_string(),
            }),
        }
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::InvalidInput(
                "embed request requires at least one text".to_string(),
            ));
        }

        let request = EmbedRequest {
            text: None,
            texts: Some(texts),
        };
        let response = self
            .retry
            .run("embed_service_embed", || self.post_embed(&request))?;

        let embeddings = response.embeddings.unwrap_or_default();
        if embeddings.len() != texts.len() {
            return Err(Error::OperationFailed {
                operation: "embed_service_embed".to_string(),
                cause: format!(
                    "expected {} embeddings, service returned {}",
                    texts.len(),
                    embeddings.len()
                ),
            });
        }

        Ok(embeddings)
    }
}

fn transport_error(operation: &str, e: &reqwest::Error) -> Error {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    };
    tracing::error!(
        provider = "embed-service",
        error = %e,
        error_kind = error_kind,
        "embedding service request failed"
    );
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{error_kind} error: {e}"),
    }
}

/// Health probe response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    /// Fixed acknowledgment, `"ok"` when healthy.
    pub status: String,
    /// Identifier of the active embedding model.
    pub model: String,
}

/// Request to the embed endpoint.
///
/// Exactly one of `text` and `texts` is set; the absent field is omitted
/// from the wire form.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    texts: Option<&'a [&'a str]>,
}

/// Response from the embed endpoint; the populated field mirrors the
/// request shape.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    embeddings: Option<Vec<Vec<f32>>>,
}
