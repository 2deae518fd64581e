//! File discovery and scanning for the file-based retrieval path.
//!
//! The scan surface is fixed: a root memory document plus markdown files
//! under a small set of named subdirectories. Discovery deduplicates paths
//! reachable through more than one rule and yields them in sorted order so
//! a scan is deterministic regardless of directory iteration order.

use super::chunker::{DEFAULT_OVERLAP, DEFAULT_WINDOW_SIZE, chunk_lines};
use super::cosine_similarity;
use crate::embedding::Embedder;
use crate::models::{SearchHit, snippet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Root memory document searched at the base directory.
pub const ROOT_DOCUMENT: &str = "MEMORY.md";

/// Subdirectories scanned recursively under the base directory.
pub const MEMORY_SUBDIRS: &[&str] = &["memory", "memories", "notes"];

/// Extension of scanned documents.
pub const MEMORY_EXTENSION: &str = "md";

/// Discovers candidate memory files under `base`.
///
/// Applies the fixed rules: the root document, then every
/// `.md` file under each of [`MEMORY_SUBDIRS`], recursively. Paths are
/// canonicalized and deduplicated, then returned in sorted order.
#[must_use]
pub fn discover_files(base: &Path) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    let root_doc = base.join(ROOT_DOCUMENT);
    if root_doc.is_file() {
        found.insert(canonical(&root_doc));
    }

    for subdir in MEMORY_SUBDIRS {
        let dir = base.join(subdir);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).into_iter().filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                None
            }
        }) {
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(MEMORY_EXTENSION)
            {
                found.insert(canonical(entry.path()));
            }
        }
    }

    found.into_iter().collect()
}

/// Scans one file into scored candidates against `query_embedding`.
///
/// The file is chunked into overlapping line windows; each chunk's
/// embedding goes through `embedder` (callers pass the cached wrapper) and
/// is scored with cosine similarity. A chunk whose embedding fails is
/// skipped with a warning; an unreadable file yields no candidates at all.
/// Neither failure aborts the surrounding search.
pub fn scan_file(base: &Path, path: &Path, embedder: &dyn Embedder, query_embedding: &[f32]) -> Vec<SearchHit> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return Vec::new();
        }
    };

    let relative = relative_name(base, path);
    let lines: Vec<&str> = contents.lines().collect();
    let mut candidates = Vec::new();

    for chunk in chunk_lines(&lines, DEFAULT_WINDOW_SIZE, DEFAULT_OVERLAP) {
        let embedding = match embedder.embed(&chunk.text) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    start_line = chunk.start_line,
                    end_line = chunk.end_line,
                    error = %e,
                    "skipping chunk that failed to embed"
                );
                continue;
            }
        };

        candidates.push(SearchHit {
            id: format!("{relative}:{}-{}", chunk.start_line, chunk.end_line),
            score: cosine_similarity(query_embedding, &embedding),
            snippet: snippet(&chunk.text),
            source: relative.clone(),
            metadata: None,
        });
    }

    candidates
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn relative_name(base: &Path, path: &Path) -> String {
    let base = canonical(base);
    let path = canonical(path);
    path.strip_prefix(&base)
        .unwrap_or(&path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // direction varies with content so scores differ
            if text.contains("dark mode") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }
    }

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
        }
        std::fs::write(path, contents).unwrap_or_else(|e| panic!("write: {e}"));
    }

    #[test]
    fn test_discovery_rules_and_dedup() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let base = dir.path();

        write(&base.join("MEMORY.md"), "root");
        write(&base.join("memory/a.md"), "a");
        write(&base.join("memory/nested/b.md"), "b");
        write(&base.join("notes/c.md"), "c");
        write(&base.join("memory/skip.txt"), "wrong extension");
        write(&base.join("unrelated/d.md"), "outside the rules");

        let files = discover_files(base);
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|p| p.extension().is_some()));
        // sorted and unique
        let mut sorted = files.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, files);
    }

    #[test]
    fn test_discovery_of_missing_base_is_empty() {
        let files = discover_files(Path::new("/nonexistent/base/dir"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_scores_matching_chunk() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("MEMORY.md");
        write(&path, "the user likes dark mode\nand tabs over spaces");

        let hits = scan_file(dir.path(), &path, &StubEmbedder, &[1.0, 0.0]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "MEMORY.md:1-2");
        assert_eq!(hits[0].source, "MEMORY.md");
        assert!(hits[0].score > 0.9);
    }

    #[test]
    fn test_scan_unreadable_file_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let missing = dir.path().join("absent.md");
        let hits = scan_file(dir.path(), &missing, &StubEmbedder, &[1.0, 0.0]);
        assert!(hits.is_empty());
    }
}
