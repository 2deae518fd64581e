//! Content-addressed embedding cache.
//!
//! Cache entries are keyed by the SHA-256 digest of the raw text bytes and
//! never expire: for a fixed model the embedding is a pure function of the
//! text, so a stored value stays valid for the lifetime of the cache
//! directory. The cache is an optimization, never a correctness
//! dependency — a failed write is logged and absorbed.

use super::Embedder;
use crate::Result;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;

/// Entries kept in the in-process LRU front layer.
const FRONT_LAYER_ENTRIES: usize = 256;

/// Returns the cache key for a text: hex-encoded SHA-256 of its bytes.
#[must_use]
pub fn content_key(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Persistent key-value store for embeddings.
///
/// Injected into [`CachedEmbedder`] so tests can substitute an in-memory
/// store for the filesystem.
pub trait CacheStore: Send + Sync {
    /// Looks up a cached embedding.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A missing entry is
    /// `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<Vec<f32>>>;

    /// Persists an embedding under the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn put(&self, key: &str, embedding: &[f32]) -> Result<()>;
}

impl<S: CacheStore + ?Sized> CacheStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<f32>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, embedding: &[f32]) -> Result<()> {
        (**self).put(key, embedding)
    }
}

/// Filesystem cache store: one JSON file per entry, named by hex digest.
///
/// The directory is created lazily on first write. Concurrent writers of
/// the same key are harmless since the value is a pure function of the key.
pub struct FilesystemCacheStore {
    dir: PathBuf,
}

impl FilesystemCacheStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FilesystemCacheStore {
    fn get(&self, key: &str) -> Result<Option<Vec<f32>>> {
        let path = self.entry_path(key);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable cache entry, treating as miss");
                return Ok(None);
            }
        };

        match serde_json::from_str::<Vec<f32>>(&contents) {
            Ok(embedding) => Ok(Some(embedding)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    fn put(&self, key: &str, embedding: &[f32]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| crate::Error::OperationFailed {
            operation: "cache_put".to_string(),
            cause: e.to_string(),
        })?;

        let contents =
            serde_json::to_string(embedding).map_err(|e| crate::Error::OperationFailed {
                operation: "cache_put".to_string(),
                cause: e.to_string(),
            })?;

        std::fs::write(self.entry_path(key), contents).map_err(|e| {
            crate::Error::OperationFailed {
                operation: "cache_put".to_string(),
                cause: e.to_string(),
            }
        })
    }
}

/// In-memory cache store.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Vec<f32>>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<Vec<f32>>> {
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned()))
    }

    fn put(&self, key: &str, embedding: &[f32]) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), embedding.to_vec());
        }
        Ok(())
    }
}

/// An [`Embedder`] wrapper that consults a [`CacheStore`] before the
/// underlying provider.
///
/// A small LRU front layer avoids re-reading the persistent store for
/// texts repeated within one process, such as identical chunks across
/// adjacent windows.
pub struct CachedEmbedder<E, S> {
    inner: E,
    store: S,
    front: Mutex<LruCache<String, Vec<f32>>>,
}

impl<E: Embedder, S: CacheStore> CachedEmbedder<E, S> {
    /// Wraps an embedder with a cache store.
    #[must_use]
    pub fn new(inner: E, store: S) -> Self {
        let capacity = NonZeroUsize::new(FRONT_LAYER_ENTRIES).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            store,
            front: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the embedding for `text`, computing it at most once.
    ///
    /// On a cache hit the provider is not invoked. On a miss the computed
    /// embedding is persisted; a persistence failure is logged and absorbed
    /// since the in-memory value is still usable for the current call.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying provider fails on a miss.
    pub fn get_or_compute(&self, text: &str) -> Result<Vec<f32>> {
        let key = content_key(text);

        if let Ok(mut front) = self.front.lock() {
            if let Some(embedding) = front.get(&key) {
                return Ok(embedding.clone());
            }
        }

        match self.store.get(&key) {
            Ok(Some(embedding)) => {
                if let Ok(mut front) = self.front.lock() {
                    front.put(key, embedding.clone());
                }
                return Ok(embedding);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed, recomputing");
            }
        }

        let embedding = self.inner.embed(text)?;

        if let Err(e) = self.store.put(&key, &embedding) {
            tracing::warn!(error = %e, "cache write failed, continuing without persistence");
        }
        if let Ok(mut front) = self.front.lock() {
            front.put(key, embedding.clone());
        }

        Ok(embedding)
    }

    /// Returns a reference to the underlying cache store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<E: Embedder, S: CacheStore> Embedder for CachedEmbedder<E, S> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.get_or_compute(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts provider invocations and returns a fixed vector.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Embedder for CountingEmbedder {
        #[allow(clippy::cast_precision_loss)]
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0, 2.0])
        }
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl CacheStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<f32>>> {
            Ok(None)
        }

        fn put(&self, _key: &str, _embedding: &[f32]) -> Result<()> {
            Err(Error::OperationFailed {
                operation: "cache_put".to_string(),
                cause: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_content_key_is_stable_sha256() {
        let key = content_key("hello");
        assert_eq!(key.len(), 64);
        assert_eq!(key, content_key("hello"));
        assert_ne!(key, content_key("hello "));
    }

    #[test]
    fn test_second_call_skips_provider() {
        let provider = CountingEmbedder::new();
        let cached = CachedEmbedder::new(&provider, MemoryCacheStore::new());

        let first = cached.get_or_compute("same text").unwrap_or_default();
        let second = cached.get_or_compute("same text").unwrap_or_default();

        assert_eq!(provider.calls(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_persisted_entry_survives_front_layer() {
        let provider = CountingEmbedder::new();
        let store = MemoryCacheStore::new();
        {
            let cached = CachedEmbedder::new(&provider, &store);
            let _ = cached.get_or_compute("text");
        }
        assert_eq!(store.len(), 1);

        // A fresh wrapper over the same store must hit persistence,
        // not the provider.
        let cached = CachedEmbedder::new(&provider, &store);
        let _ = cached.get_or_compute("text");
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_write_failure_does_not_fail_lookup() {
        let provider = CountingEmbedder::new();
        let cached = CachedEmbedder::new(&provider, ReadOnlyStore);

        let result = cached.get_or_compute("text");
        assert!(result.is_ok());
    }

    #[test]
    fn test_filesystem_store_round_trip() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = FilesystemCacheStore::new(dir.path().join("embeddings"));

        let key = content_key("some text");
        assert_eq!(store.get(&key).unwrap_or_default(), None);

        store
            .put(&key, &[0.25, -1.5, 3.0])
            .unwrap_or_else(|e| panic!("put: {e}"));
        assert_eq!(
            store.get(&key).unwrap_or_default(),
            Some(vec![0.25, -1.5, 3.0])
        );
    }

    #[test]
    fn test_filesystem_store_corrupt_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = FilesystemCacheStore::new(dir.path());

        let key = content_key("text");
        std::fs::write(dir.path().join(format!("{key}.json")), "not json")
            .unwrap_or_else(|e| panic!("write: {e}"));

        assert_eq!(store.get(&key).unwrap_or_default(), None);
    }
}
