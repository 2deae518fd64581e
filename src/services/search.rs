//! Search strategies.
//!
//! Two retrieval paths share one interface: the store-backed strategy lets
//! the vector store rank within each collection and derives similarity
//! from its reported distance, while the file-backed strategy ranks
//! cache-assisted chunk embeddings locally. Both finish in the same
//! filter → sort → truncate pipeline, so a query flows
//! `QueryEmbedded → CandidatesGathered → Filtered → Sorted → Truncated`
//! regardless of the path.

use crate::embedding::Embedder;
use crate::models::{Collection, SearchHit, SearchOptions, snippet};
use crate::search::{distance_to_similarity, files, rank};
use crate::store::MemoryStore;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Which collections a store-backed search consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchTarget {
    /// Search every collection and merge.
    #[default]
    All,
    /// Search a single collection.
    One(Collection),
}

impl SearchTarget {
    /// Parses a target name; `"all"` selects every collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for names outside the enumeration.
    pub fn parse(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Collection::parse(s).map(Self::One)
        }
    }

    fn collections(self) -> Vec<Collection> {
        match self {
            Self::All => Collection::all().to_vec(),
            Self::One(collection) => vec![collection],
        }
    }
}

/// A retrieval strategy: query text in, ranked results out.
pub trait SearchStrategy {
    /// Runs a search for `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query itself cannot be embedded; downstream
    /// per-source failures degrade coverage instead of failing the search.
    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>>;
}

/// Store-backed search: the backend performs nearest-neighbor ranking per
/// collection, results are merged and re-ranked globally.
pub struct StoreSearch<'a> {
    store: &'a dyn MemoryStore,
    embedder: &'a dyn Embedder,
    target: SearchTarget,
}

impl<'a> StoreSearch<'a> {
    /// Creates a store-backed search over the given target.
    #[must_use]
    pub fn new(
        store: &'a dyn MemoryStore,
        embedder: &'a dyn Embedder,
        target: SearchTarget,
    ) -> Self {
        Self {
            store,
            embedder,
            target,
        }
    }
}

impl SearchStrategy for StoreSearch<'_> {
    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".to_string()));
        }

        // Terminal on failure: nothing downstream works without it.
        let query_embedding = self.embedder.embed(query)?;

        let mut candidates = Vec::new();
        for collection in self.target.collections() {
            let hits = self
                .store
                .query(collection, &query_embedding, options.top_k)?;
            tracing::debug!(
                collection = %collection,
                hits = hits.len(),
                "collection queried"
            );
            for hit in hits {
                candidates.push(SearchHit {
                    id: hit.id,
                    score: distance_to_similarity(hit.distance.unwrap_or(1.0)),
                    snippet: snippet(hit.document.as_deref().unwrap_or_default()),
                    source: collection.as_str().to_string(),
                    metadata: hit.metadata,
                });
            }
        }

        Ok(rank(candidates, options.min_score, options.top_k))
    }
}

/// File-backed search over a base directory of markdown memory documents.
pub struct FileSearch<'a> {
    embedder: &'a dyn Embedder,
    base_dir: PathBuf,
    deadline: Option<Duration>,
}

impl<'a> FileSearch<'a> {
    /// Creates a file-backed search rooted at `base_dir`.
    ///
    /// Callers pass a cache-wrapped embedder so repeated scans only pay
    /// for chunks whose text changed.
    #[must_use]
    pub fn new(embedder: &'a dyn Embedder, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            embedder,
            base_dir: base_dir.into(),
            deadline: None,
        }
    }

    /// Bounds the whole scan; files not reached in time are skipped and
    /// the results collected so far are still ranked and returned.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl SearchStrategy for FileSearch<'_> {
    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".to_string()));
        }

        let query_embedding = self.embedder.embed(query)?;
        let started = Instant::now();

        let mut candidates = Vec::new();
        for path in files::discover_files(&self.base_dir) {
            if let Some(deadline) = self.deadline {
                if started.elapsed() > deadline {
                    tracing::warn!(
                        path = %path.display(),
                        "scan deadline exceeded, returning partial results"
                    );
                    break;
                }
            }
            candidates.extend(files::scan_file(
                &self.base_dir,
                &path,
                self.embedder,
                &query_embedding,
            ));
        }

        Ok(rank(candidates, options.min_score, options.top_k))
    }
}
