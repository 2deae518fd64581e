//! Memory storage service.

use crate::embedding::Embedder;
use crate::models::{Collection, MemoryId, MemoryMetadata, MemoryRecord};
use crate::store::MemoryStore;
use crate::{Error, Result};
use serde::Serialize;

/// Request to store one memory.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    /// Target collection.
    pub collection: Collection,
    /// The text to store.
    pub text: String,
    /// Comma-separated tags, empty for none.
    pub tags: String,
    /// Source reference (session, channel), empty for none.
    pub source: String,
    /// Importance weight; clamped into `[0.0, 1.0]`.
    pub importance: f32,
}

/// Result of a successful store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreOutcome {
    /// The deterministic record id.
    pub id: MemoryId,
    /// The collection stored into.
    pub collection: Collection,
    /// Always true; kept for output-shape stability.
    pub stored: bool,
}

/// Stores a memory: validates, embeds, and upserts.
///
/// The id is derived from the text, so storing identical text twice
/// replaces the record and its metadata instead of duplicating it.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for empty text, or a transport error
/// if embedding or the store upsert fails. An embedding failure is
/// terminal: nothing is written without a vector.
pub fn store_memory(
    store: &dyn MemoryStore,
    embedder: &dyn Embedder,
    request: &StoreRequest,
) -> Result<StoreOutcome> {
    if request.text.trim().is_empty() {
        return Err(Error::InvalidInput("text cannot be empty".to_string()));
    }

    let id = MemoryId::from_text(&request.text);
    let embedding = embedder.embed(&request.text)?;

    let metadata = MemoryMetadata {
        timestamp: Some(crate::current_timestamp()),
        importance: Some(request.importance.clamp(0.0, 1.0)),
        tags: (!request.tags.is_empty()).then(|| request.tags.clone()),
        source: (!request.source.is_empty()).then(|| request.source.clone()),
    };

    let record = MemoryRecord {
        id: id.clone(),
        text: request.text.clone(),
        embedding,
        metadata,
        collection: request.collection,
    };

    store.upsert(&record)?;

    tracing::debug!(
        id = %id,
        collection = %request.collection,
        "memory stored"
    );

    Ok(StoreOutcome {
        id,
        collection: request.collection,
        stored: true,
    })
}
