//! # Nanomem
//!
//! Semantic memory storage and retrieval for AI agents.
//!
//! Nanomem stores short text memories with embeddings in a vector-store
//! backend and retrieves them by semantic similarity. A flat-file fallback
//! path searches a directory of markdown documents by chunking them into
//! overlapping windows and ranking cached chunk embeddings locally.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nanomem::models::SearchOptions;
//! use nanomem::services::{SearchStrategy, SearchTarget, StoreSearch};
//!
//! let search = StoreSearch::new(&store, &embedder, SearchTarget::All);
//! let hits = search.search("dark mode preference", &SearchOptions::default())?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod embedding;
pub mod models;
pub mod observability;
pub mod search;
pub mod services;
pub mod store;
pub mod transport;

// Re-exports for convenience
pub use config::MemoryConfig;
pub use embedding::{CacheStore, CachedEmbedder, Embedder};
pub use models::{Collection, MemoryId, MemoryMetadata, MemoryRecord, SearchHit, SearchOptions};
pub use services::{FileSearch, SearchStrategy, StoreSearch};
pub use store::MemoryStore;

/// Error type for nanomem operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A collection name outside the fixed enumeration is given
    /// - The text to store or the search query is empty
    /// - An embedding request carries no input
    ///
    /// These are rejected before any network call is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The embedding provider is unreachable or times out
    /// - The vector-store backend returns an error status
    /// - A response cannot be parsed or has the wrong cardinality
    /// - Filesystem I/O errors occur outside the absorb-and-skip paths
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for nanomem operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Uses `SystemTime::now()` with fallback to 0 if the system clock is
/// before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
