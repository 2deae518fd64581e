//! Search results and options.

use super::MemoryMetadata;
use serde::Serialize;

/// Maximum number of characters kept in a result snippet.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 5;

/// Default minimum similarity score.
pub const DEFAULT_MIN_SCORE: f32 = 0.3;

/// Options shared by every search strategy.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of results after filtering and sorting.
    pub top_k: usize,
    /// Minimum cosine similarity; lower-scored candidates are dropped.
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl SearchOptions {
    /// Creates options with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the minimum score threshold.
    #[must_use]
    pub const fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

/// A single ranked search result.
///
/// Constructed per query and discarded after output. The `score` carries
/// full precision while candidates flow through filtering and sorting; it
/// is rounded to 4 decimal places only when the final ranked list is built.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Memory id, or `relative/path:start-end` for a file chunk.
    pub id: String,
    /// Cosine similarity against the query.
    pub score: f32,
    /// Content preview, capped at [`SNIPPET_MAX_CHARS`].
    #[serde(rename = "text")]
    pub snippet: String,
    /// Collection name or relative file path this hit came from.
    pub source: String,
    /// Metadata passthrough from the stored record, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MemoryMetadata>,
}

/// Truncates `text` to a snippet of at most [`SNIPPET_MAX_CHARS`]
/// characters, respecting char boundaries.
#[must_use]
pub fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn test_snippet_keeps_short_text() {
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let text = "ä".repeat(300);
        let s = snippet(&text);
        assert_eq!(s.chars().count(), SNIPPET_MAX_CHARS);
        assert!(s.chars().all(|c| c == 'ä'));
    }

    #[test]
    fn test_hit_serializes_without_empty_metadata() {
        let hit = SearchHit {
            id: "abc".to_string(),
            score: 0.5,
            snippet: "text".to_string(),
            source: "knowledge".to_string(),
            metadata: None,
        };
        let json = serde_json::to_string(&hit).unwrap_or_default();
        assert!(!json.contains("metadata"));
        assert!(json.contains("\"text\""));
    }
}
