//! Memory records and identifiers.

use super::Collection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex characters kept from the content digest.
const ID_HEX_LEN: usize = 16;

/// Unique identifier for a memory.
///
/// Derived deterministically from the memory text, so re-storing identical
/// text always produces the same id and storage stays an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(String);

impl MemoryId {
    /// Creates a memory ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the deterministic ID for a memory text.
    ///
    /// The id is the first 16 hex characters of the SHA-256 digest of the
    /// raw text bytes.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(ID_HEX_LEN);
        Self(hex)
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MemoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MemoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Metadata attached to a stored memory.
///
/// All fields are optional; `tags` and `source` are omitted from the wire
/// form entirely when absent, matching what the store backend returns when
/// they were never set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    /// Creation timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Importance weight in `[0.0, 1.0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f32>,
    /// Comma-joined tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Free-form source reference (session, channel, file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A memory record stored in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    /// Deterministic content-derived identifier.
    pub id: MemoryId,
    /// The stored text, uncapped.
    pub text: String,
    /// The embedding vector for the text.
    pub embedding: Vec<f32>,
    /// Optional metadata fields.
    pub metadata: MemoryMetadata,
    /// The collection this record belongs to.
    pub collection: Collection,
}
