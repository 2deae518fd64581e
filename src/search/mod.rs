//! Similarity ranking.
//!
//! The ranker is shared by both retrieval paths: candidates arrive either
//! pre-scored by the vector store (as a cosine distance) or as raw
//! embeddings scored locally, then flow through the same
//! filter → sort → truncate pipeline.

pub mod chunker;
pub mod files;

pub use chunker::{Chunk, DEFAULT_OVERLAP, DEFAULT_WINDOW_SIZE, chunk_lines};

use crate::models::SearchHit;
use std::cmp::Ordering;

/// Computes the cosine similarity between two vectors.
///
/// Defined as `dot(a, b) / (norm(a) * norm(b))`. When either norm is zero
/// the similarity is exactly `0.0`: a zero vector never matches anything,
/// and never produces NaN.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Converts a backend-reported cosine distance to a similarity score.
#[must_use]
pub fn distance_to_similarity(distance: f32) -> f32 {
    1.0 - distance
}

/// Rounds a score to 4 decimal places for presentation.
#[must_use]
pub fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

/// Filters, sorts, and truncates candidates into the final ranked list.
///
/// Candidates below `min_score` are dropped, the rest are sorted strictly
/// descending by score with ties keeping their input order (stable sort,
/// first seen wins), and the list is cut to `top_k`. Filtering and sorting
/// use full precision; scores are rounded to 4 decimal places only on the
/// surviving results, so rounding can never invert a rank.
#[must_use]
pub fn rank(mut candidates: Vec<SearchHit>, min_score: f32, top_k: usize) -> Vec<SearchHit> {
    candidates.retain(|hit| hit.score >= min_score);
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates.truncate(top_k);
    for hit in &mut candidates {
        hit.score = round_score(hit.score);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f32) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            score,
            snippet: String::new(),
            source: "knowledge".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.6, 0.8];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero_not_nan() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0], &[0.0]), 0.0);
    }

    #[test]
    fn test_distance_conversion() {
        assert!((distance_to_similarity(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_rank_sorts_descending() {
        let ranked = rank(vec![hit("a", 0.2), hit("b", 0.9), hit("c", 0.5)], 0.0, 10);
        let ids: Vec<&str> = ranked.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank(
            vec![hit("first", 0.5), hit("second", 0.5), hit("third", 0.5)],
            0.0,
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn test_rank_filters_below_threshold() {
        let ranked = rank(vec![hit("a", 0.29), hit("b", 0.3), hit("c", 0.8)], 0.3, 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|h| h.score >= 0.3));
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let candidates = (0..10)
            .map(|i| {
                let score = 0.9 - 0.05 * i as f32;
                hit(&format!("m{i}"), score)
            })
            .collect();
        let ranked = rank(candidates, 0.0, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].id, "m0");
    }

    #[test]
    fn test_rank_rounds_after_ordering() {
        // Both round to 0.5000, but the higher-precision score must win.
        let ranked = rank(vec![hit("low", 0.499_96), hit("high", 0.500_04)], 0.0, 10);
        assert_eq!(ranked[0].id, "high");
        assert_eq!(ranked[0].score, 0.5);
        assert_eq!(ranked[1].score, 0.5);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123_456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
        assert_eq!(round_score(-0.123_44), -0.1234);
    }
}
