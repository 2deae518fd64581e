//! Ollama-compatible embedding client.

use super::Embedder;
use crate::transport::{HttpConfig, RetryPolicy, build_http_client};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Client for an Ollama-compatible `/v1/embeddings` endpoint.
pub struct OllamaEmbedder {
    /// API endpoint.
    base_url: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Retry policy for transport failures.
    retry: RetryPolicy,
}

impl OllamaEmbedder {
    /// Default API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = crate::config::DEFAULT_OLLAMA_BASE_URL;

    /// Default embedding model.
    pub const DEFAULT_MODEL: &'static str = crate::config::DEFAULT_EMBEDDING_MODEL;

    /// Creates a new client with default endpoint and model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(HttpConfig::default()),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a client from configuration.
    #[must_use]
    pub fn from_config(config: &crate::MemoryConfig) -> Self {
        Self {
            base_url: config.ollama_base_url.clone(),
            model: config.embedding_model.clone(),
            client: build_http_client(config.http),
            retry: config.retry,
        }
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
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

    fn request(&self, input: &str) -> Result<Vec<f32>> {
        let request = EmbeddingsRequest {
            model: self.model.clone(),
            input: input.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| {
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
                    provider = "ollama",
                    model = %self.model,
                    error = %e,
                    error_kind = error_kind,
                    "embedding request failed"
                );
                Error::OperationFailed {
                    operation: "ollama_embed".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                status = %status,
                body = %body,
                "embedding API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "ollama_embed".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: EmbeddingsResponse = response.json().map_err(|e| {
            tracing::error!(
                provider = "ollama",
                model = %self.model,
                error = %e,
                "failed to parse embedding response"
            );
            Error::OperationFailed {
                operation: "ollama_embed".to_string(),
                cause: e.to_string(),
            }
        })?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default();

        if embedding.is_empty() {
            return Err(Error::OperationFailed {
                operation: "ollama_embed".to_string(),
                cause: "provider returned an empty embedding".to_string(),
            });
        }

        Ok(embedding)
    }
}

impl Default for OllamaEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::InvalidInput("text to embed is empty".to_string()));
        }
        self.retry.run("ollama_embed", || self.request(text))
    }
}

/// Request to the embeddings API.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: String,
}

/// Response from the embeddings API.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

/// One embedding in the response data array.
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
