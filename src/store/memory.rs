//! In-memory store backend.
//!
//! A linear-scan backend with the same observable behavior as the remote
//! one: lazily created collections, idempotent upsert, nearest-neighbor
//! query reporting cosine distances. Backs the integration tests and any
//! embedded use that has no vector store to talk to.

use super::{CollectionInfo, MemoryStore, QueryHit, StoredEntry};
use crate::models::{Collection, MemoryRecord};
use crate::search::cosine_similarity;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Mutex;

type Shelf = BTreeMap<String, MemoryRecord>;

/// In-memory memory store.
#[derive(Default)]
pub struct InMemoryStore {
    // one shelf per lazily created collection, keyed by record id
    collections: Mutex<BTreeMap<Collection, Shelf>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<Collection, Shelf>>> {
        self.collections.lock().map_err(|_| Error::OperationFailed {
            operation: "memory_store_lock".to_string(),
            cause: "store mutex poisoned".to_string(),
        })
    }
}

impl MemoryStore for InMemoryStore {
    fn upsert(&self, record: &MemoryRecord) -> Result<()> {
        let mut collections = self.locked()?;
        collections
            .entry(record.collection)
            .or_default()
            .insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn query(
        &self,
        collection: Collection,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>> {
        let collections = self.locked()?;
        let Some(shelf) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<QueryHit> = shelf
            .values()
            .map(|record| QueryHit {
                id: record.id.as_str().to_string(),
                document: Some(record.text.clone()),
                metadata: Some(record.metadata.clone()),
                distance: Some(1.0 - cosine_similarity(query_embedding, &record.embedding)),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    fn entries(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntry>> {
        let collections = self.locked()?;
        let Some(shelf) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        Ok(shelf
            .values()
            .take(limit)
            .map(|record| StoredEntry {
                id: record.id.as_str().to_string(),
                document: Some(record.text.clone()),
                metadata: Some(record.metadata.clone()),
            })
            .collect())
    }

    fn collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.locked()?;
        Ok(collections
            .iter()
            .map(|(collection, shelf)| CollectionInfo {
                name: collection.as_str().to_string(),
                count: shelf.len(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemoryId, MemoryMetadata};

    fn record(text: &str, embedding: Vec<f32>) -> MemoryRecord {
        MemoryRecord {
            id: MemoryId::from_text(text),
            text: text.to_string(),
            embedding,
            metadata: MemoryMetadata::default(),
            collection: Collection::Knowledge,
        }
    }

    #[test]
    fn test_missing_collection_queries_empty() {
        let store = InMemoryStore::new();
        let hits = store
            .query(Collection::Tasks, &[1.0, 0.0], 5)
            .unwrap_or_default();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_upsert_replaces_same_id() {
        let store = InMemoryStore::new();
        let mut rec = record("same text", vec![1.0, 0.0]);
        store.upsert(&rec).unwrap_or_else(|e| panic!("upsert: {e}"));

        rec.metadata.importance = Some(0.9);
        store.upsert(&rec).unwrap_or_else(|e| panic!("upsert: {e}"));

        let entries = store
            .entries(Collection::Knowledge, 10)
            .unwrap_or_default();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].metadata.as_ref().and_then(|m| m.importance),
            Some(0.9)
        );
    }

    #[test]
    fn test_query_orders_by_distance() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("far", vec![0.0, 1.0]))
            .unwrap_or_else(|e| panic!("upsert: {e}"));
        store
            .upsert(&record("near", vec![1.0, 0.0]))
            .unwrap_or_else(|e| panic!("upsert: {e}"));

        let hits = store
            .query(Collection::Knowledge, &[1.0, 0.0], 10)
            .unwrap_or_default();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.as_deref(), Some("near"));
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn test_collections_report_counts() {
        let store = InMemoryStore::new();
        store
            .upsert(&record("one", vec![1.0]))
            .unwrap_or_else(|e| panic!("upsert: {e}"));
        store
            .upsert(&record("two", vec![0.5]))
            .unwrap_or_else(|e| panic!("upsert: {e}"));

        let infos = store.collections().unwrap_or_default();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "knowledge");
        assert_eq!(infos[0].count, 2);
    }
}
