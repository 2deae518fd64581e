//! Memory store backends.
//!
//! The store is the authoritative home of memory records. The trait is
//! deliberately thin: upsert into a named collection and nearest-neighbor
//! query by embedding, plus the listing operations the CLI needs.
//! Collections are created lazily on first store, so querying one that
//! does not exist yet is a normal state that yields an empty result.

mod chroma;
mod memory;

pub use chroma::ChromaStore;
pub use memory::InMemoryStore;

use crate::Result;
use crate::models::{Collection, MemoryMetadata, MemoryRecord};

/// A candidate returned by a nearest-neighbor query.
///
/// `document`, `metadata`, and `distance` are present only when the
/// backend was asked to include them; absent fields are `None` rather
/// than defaulted, so callers decide how to treat a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    /// Record identifier.
    pub id: String,
    /// Stored document text, if requested.
    pub document: Option<String>,
    /// Stored metadata, if requested.
    pub metadata: Option<MemoryMetadata>,
    /// Cosine distance from the query embedding, if requested.
    pub distance: Option<f32>,
}

/// A stored entry as returned by a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    /// Record identifier.
    pub id: String,
    /// Stored document text, if requested.
    pub document: Option<String>,
    /// Stored metadata, if requested.
    pub metadata: Option<MemoryMetadata>,
}

/// A collection with its record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Number of stored records.
    pub count: usize,
}

/// Trait for memory store backends.
///
/// Implementations should be thread-safe (`Send + Sync`) and use interior
/// mutability where they hold state.
pub trait MemoryStore: Send + Sync {
    /// Inserts or fully replaces the record with its id.
    ///
    /// Idempotent: storing the same id twice leaves exactly one record
    /// carrying the latest text, embedding, and metadata. The target
    /// collection is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn upsert(&self, record: &MemoryRecord) -> Result<()>;

    /// Returns up to `k` nearest candidates with their cosine distances.
    ///
    /// A collection that has never been stored to yields `Ok` with an
    /// empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails.
    fn query(
        &self,
        collection: Collection,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>>;

    /// Lists up to `limit` entries of a collection.
    ///
    /// A missing collection yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn entries(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntry>>;

    /// Lists existing collections with their record counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn collections(&self) -> Result<Vec<CollectionInfo>>;
}

impl<S: MemoryStore + ?Sized> MemoryStore for &S {
    fn upsert(&self, record: &MemoryRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn query(
        &self,
        collection: Collection,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>> {
        (**self).query(collection, query_embedding, k)
    }

    fn entries(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntry>> {
        (**self).entries(collection, limit)
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>> {
        (**self).collections()
    }
}
