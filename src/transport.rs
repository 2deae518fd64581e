//! HTTP transport configuration and retry policy.
//!
//! Every network call to the embedding provider or the vector store goes
//! through a client built here, with bounded timeouts and an explicit,
//! bounded retry policy.

use crate::Result;
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl HttpConfig {
    /// Creates a configuration with the given request timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("NANOMEM_HTTP_TIMEOUT_MS") {
            if let Ok(timeout_ms) = v.parse::<u64>() {
                self.timeout_ms = timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("NANOMEM_HTTP_CONNECT_TIMEOUT_MS") {
            if let Ok(connect_timeout_ms) = v.parse::<u64>() {
                self.connect_timeout_ms = connect_timeout_ms;
            }
        }
        self
    }
}

/// Builds a blocking HTTP client with configured timeouts.
#[must_use]
pub fn build_http_client(config: HttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }
    builder
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
}

/// Bounded retry policy for transport calls.
///
/// Transient failures are retried up to `max_retries` times with a linear
/// backoff of `backoff_ms * attempt`. The value for a given request is a
/// pure function of the request, so repeating a call is always safe.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base backoff between retries in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_ms: 200,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_ms: 0,
        }
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("NANOMEM_MAX_RETRIES") {
            if let Ok(max_retries) = v.parse::<u32>() {
                self.max_retries = max_retries;
            }
        }
        if let Ok(v) = std::env::var("NANOMEM_RETRY_BACKOFF_MS") {
            if let Ok(backoff_ms) = v.parse::<u64>() {
                self.backoff_ms = backoff_ms;
            }
        }
        self
    }

    /// Runs `call` under this policy, retrying on failure.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted.
    pub fn run<T>(&self, operation: &str, call: impl Fn() -> Result<T>) -> Result<T> {
        let mut attempt: u32 = 0;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "transport call failed, retrying"
                    );
                    std::thread::sleep(Duration::from_millis(
                        self.backoff_ms.saturating_mul(u64::from(attempt)),
                    ));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
