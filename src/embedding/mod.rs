//! Embedding generation.
//!
//! Embeddings come from one of two remote providers: an Ollama-compatible
//! endpoint or the local embedding sidecar service. Both sit behind the
//! [`Embedder`] trait; [`CachedEmbedder`] wraps either with a persistent
//! content-addressed cache.

mod cache;
mod ollama;
mod service;

pub use cache::{CacheStore, CachedEmbedder, FilesystemCacheStore, MemoryCacheStore, content_key};
pub use ollama::OllamaEmbedder;
pub use service::{EmbedServiceClient, HealthStatus};

use crate::Result;

/// Trait for embedding generators.
///
/// An empty response is an error, never a zero vector; a zero vector would
/// silently match nothing while looking like a valid result.
pub trait Embedder: Send + Sync {
    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts, order-preserving and
    /// one-to-one with the input.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }
}
