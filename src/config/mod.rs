//! Configuration management.
//!
//! All external endpoints are injected through [`MemoryConfig`] rather than
//! read from the process environment at call sites. Defaults are named
//! constants; every value can be overridden by an environment variable or a
//! TOML config file in the platform config directory.

use crate::transport::{HttpConfig, RetryPolicy};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default vector-store host.
pub const DEFAULT_CHROMA_HOST: &str = "192.168.64.1";

/// Default vector-store port.
pub const DEFAULT_CHROMA_PORT: u16 = 8000;

/// Default Ollama-compatible embedding endpoint.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://192.168.64.1:30068";

/// Default embedding model identifier.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text-v2-moe";

/// Port of the embedding sidecar service, colocated with the vector store.
pub const DEFAULT_EMBED_SERVICE_PORT: u16 = 8001;

/// Main configuration for nanomem.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Vector-store host.
    pub chroma_host: String,
    /// Vector-store port.
    pub chroma_port: u16,
    /// Base URL of the Ollama-compatible embedding provider.
    pub ollama_base_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Base URL of the embedding sidecar service.
    pub embed_service_url: String,
    /// On-disk embedding cache directory.
    pub cache_dir: PathBuf,
    /// Base directory for the file-based retrieval path.
    pub memory_base_dir: PathBuf,
    /// HTTP timeouts.
    pub http: HttpConfig,
    /// Transport retry policy.
    pub retry: RetryPolicy,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            chroma_host: DEFAULT_CHROMA_HOST.to_string(),
            chroma_port: DEFAULT_CHROMA_PORT,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embed_service_url: format!("http://{DEFAULT_CHROMA_HOST}:{DEFAULT_EMBED_SERVICE_PORT}"),
            cache_dir: default_cache_dir(),
            memory_base_dir: PathBuf::from("."),
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl MemoryConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration: defaults, then the config file if present,
    /// then environment overrides.
    #[must_use]
    pub fn load() -> Self {
        Self::load_default().with_env_overrides()
    }

    /// Loads configuration from the default config file location, falling
    /// back to defaults when no file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let config_path = base_dirs.config_dir().join("nanomem").join("config.toml");
        if config_path.exists() {
            if let Ok(config) = Self::load_from_file(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Applies environment variable overrides.
    ///
    /// Recognized variables: `CHROMADB_HOST`, `CHROMADB_PORT`,
    /// `OLLAMA_BASE_URL`, `EMBEDDING_MODEL`, `EMBED_URL`,
    /// `EMBED_CACHE_DIR`, `MEMORY_BASE_DIR`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        let mut host_overridden = false;
        if let Ok(v) = std::env::var("CHROMADB_HOST") {
            if !v.is_empty() {
                self.chroma_host = v;
                host_overridden = true;
            }
        }
        if let Ok(v) = std::env::var("CHROMADB_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.chroma_port = port;
            }
        }
        // The sidecar follows the store host unless EMBED_URL pins it.
        if host_overridden {
            self.embed_service_url =
                format!("http://{}:{DEFAULT_EMBED_SERVICE_PORT}", self.chroma_host);
        }
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            if !v.is_empty() {
                self.ollama_base_url = v;
            }
        }
        if let Ok(v) = std::env::var("EMBEDDING_MODEL") {
            if !v.is_empty() {
                self.embedding_model = v;
            }
        }
        if let Ok(v) = std::env::var("EMBED_URL") {
            if !v.is_empty() {
                self.embed_service_url = v;
            }
        }
        if let Ok(v) = std::env::var("EMBED_CACHE_DIR") {
            if !v.is_empty() {
                self.cache_dir = PathBuf::from(v);
            }
        }
        if let Ok(v) = std::env::var("MEMORY_BASE_DIR") {
            if !v.is_empty() {
                self.memory_base_dir = PathBuf::from(v);
            }
        }
        self.http = self.http.with_env_overrides();
        self.retry = self.retry.with_env_overrides();
        self
    }

    /// Returns the vector-store base URL.
    #[must_use]
    pub fn chroma_url(&self) -> String {
        format!("http://{}:{}", self.chroma_host, self.chroma_port)
    }

    /// Sets the cache directory.
    #[must_use]
    pub fn with_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_dir = path.into();
        self
    }

    /// Sets the memory base directory.
    #[must_use]
    pub fn with_memory_base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.memory_base_dir = path.into();
        self
    }

    /// Converts a `ConfigFile` to a `MemoryConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(host) = file.chroma_host {
            config.embed_service_url = format!("http://{host}:{DEFAULT_EMBED_SERVICE_PORT}");
            config.chroma_host = host;
        }
        if let Some(port) = file.chroma_port {
            config.chroma_port = port;
        }
        if let Some(url) = file.ollama_base_url {
            config.ollama_base_url = url;
        }
        if let Some(model) = file.embedding_model {
            config.embedding_model = model;
        }
        if let Some(url) = file.embed_service_url {
            config.embed_service_url = url;
        }
        if let Some(dir) = file.cache_dir {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(dir) = file.memory_base_dir {
            config.memory_base_dir = PathBuf::from(dir);
        }
        if let Some(timeout_ms) = file.http_timeout_ms {
            config.http.timeout_ms = timeout_ms;
        }
        if let Some(max_retries) = file.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(backoff_ms) = file.retry_backoff_ms {
            config.retry.backoff_ms = backoff_ms;
        }

        config
    }
}

/// Returns the platform cache directory for embeddings.
fn default_cache_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".nanomem/embeddings"),
        |dirs| dirs.cache_dir().join("nanomem").join("embeddings"),
    )
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    chroma_host: Option<String>,
    chroma_port: Option<u16>,
    ollama_base_url: Option<String>,
    embedding_model: Option<String>,
    embed_service_url: Option<String>,
    cache_dir: Option<String>,
    memory_base_dir: Option<String>,
    http_timeout_ms: Option<u64>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MemoryConfig::default();
        assert_eq!(config.chroma_host, DEFAULT_CHROMA_HOST);
        assert_eq!(config.chroma_port, DEFAULT_CHROMA_PORT);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.chroma_url(), "http://192.168.64.1:8000");
        assert_eq!(config.embed_service_url, "http://192.168.64.1:8001");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
chroma_host = "10.0.0.5"
chroma_port = 9000
embedding_model = "all-minilm"
max_retries = 5
"#,
        )
        .unwrap_or_else(|e| panic!("write: {e}"));

        let config = MemoryConfig::load_from_file(&path).unwrap_or_else(|e| panic!("load: {e}"));
        assert_eq!(config.chroma_host, "10.0.0.5");
        assert_eq!(config.chroma_port, 9000);
        assert_eq!(config.embedding_model, "all-minilm");
        assert_eq!(config.retry.max_retries, 5);
        // sidecar follows the store host when not pinned
        assert_eq!(config.embed_service_url, "http://10.0.0.5:8001");
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "chroma_port = \"not a port").unwrap_or_else(|e| panic!("write: {e}"));
        assert!(MemoryConfig::load_from_file(&path).is_err());
    }
}
