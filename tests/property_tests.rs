//! Property-based tests for the chunker and the ranker.
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use nanomem::models::SearchHit;
use nanomem::search::{chunk_lines, cosine_similarity, rank};
use proptest::prelude::*;

fn non_blank_lines(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,12}", 1..max)
}

fn hits(max: usize) -> impl Strategy<Value = Vec<SearchHit>> {
    prop::collection::vec((0.0f32..1.0), 0..max).prop_map(|scores| {
        scores
            .into_iter()
            .enumerate()
            .map(|(i, score)| SearchHit {
                id: format!("m{i}"),
                score,
                snippet: String::new(),
                source: "knowledge".to_string(),
                metadata: None,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn chunker_covers_every_line(
        lines in non_blank_lines(400),
        window in 1usize..120,
        overlap in 0usize..150,
    ) {
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let chunks = chunk_lines(&refs, window, overlap);

        let mut covered = vec![false; refs.len()];
        for chunk in &chunks {
            prop_assert!(chunk.start_line >= 1);
            prop_assert!(chunk.end_line <= refs.len());
            prop_assert!(chunk.start_line <= chunk.end_line);
            for line in chunk.start_line..=chunk.end_line {
                covered[line - 1] = true;
            }
        }
        // no line of a non-blank document is lost
        prop_assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn chunker_starts_advance_monotonically(
        lines in non_blank_lines(400),
        window in 1usize..120,
        overlap in 0usize..150,
    ) {
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let chunks = chunk_lines(&refs, window, overlap);

        for pair in chunks.windows(2) {
            prop_assert!(pair[1].start_line > pair[0].start_line);
        }
    }

    #[test]
    fn chunker_adjacent_overlap_is_exact(
        lines in non_blank_lines(400),
        window in 2usize..120,
        overlap in 0usize..120,
    ) {
        prop_assume!(overlap < window);
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let chunks = chunk_lines(&refs, window, overlap);

        for pair in chunks.windows(2) {
            let shared = (pair[0].end_line + 1).saturating_sub(pair[1].start_line);
            // a full window shares exactly `overlap` lines with its
            // successor; a window clamped at the end of the document
            // shares fewer
            let first_is_full = pair[0].end_line - pair[0].start_line + 1 == window;
            if first_is_full {
                prop_assert_eq!(shared, overlap);
            } else {
                prop_assert!(shared <= overlap);
            }
        }
    }

    #[test]
    fn rank_output_is_sorted_bounded_and_filtered(
        candidates in hits(64),
        min_score in 0.0f32..1.0,
        top_k in 0usize..20,
    ) {
        let ranked = rank(candidates.clone(), min_score, top_k);

        prop_assert!(ranked.len() <= top_k);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        // rounding happens after filtering and moves a score by at most 5e-5
        for hit in &ranked {
            prop_assert!(hit.score >= min_score - 5e-5);
        }
        // every output id came from the input
        for hit in &ranked {
            prop_assert!(candidates.iter().any(|c| c.id == hit.id));
        }
    }

    #[test]
    fn rank_keeps_everything_above_threshold_when_room(
        candidates in hits(16),
        min_score in 0.0f32..1.0,
    ) {
        let eligible = candidates
            .iter()
            .filter(|c| c.score >= min_score)
            .count();
        let ranked = rank(candidates, min_score, usize::MAX);
        prop_assert_eq!(ranked.len(), eligible);
    }

    #[test]
    fn cosine_is_symmetric_and_bounded(
        a in prop::collection::vec(-10.0f32..10.0, 1..16),
        b in prop::collection::vec(-10.0f32..10.0, 1..16),
    ) {
        let len = a.len().min(b.len());
        let (a, b) = (&a[..len], &b[..len]);
        let ab = cosine_similarity(a, b);
        let ba = cosine_similarity(b, a);
        prop_assert!((ab - ba).abs() < 1e-5);
        prop_assert!(ab.is_finite());
        prop_assert!((-1.0001..=1.0001).contains(&ab));
    }
}
