//! Line-window chunking for piecewise embedding.

/// Default number of lines per chunk.
pub const DEFAULT_WINDOW_SIZE: usize = 500;

/// Default number of lines shared between adjacent chunks.
pub const DEFAULT_OVERLAP: usize = 50;

/// A line-bounded slice of a source document.
///
/// Ephemeral: chunks are produced per scan and never persisted; only the
/// embedding of the chunk text is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Trimmed chunk text.
    pub text: String,
    /// First source line, 1-indexed, inclusive.
    pub start_line: usize,
    /// Last source line, 1-indexed, inclusive.
    pub end_line: usize,
}

/// Splits `lines` into overlapping windows of `window_size` lines.
///
/// The window start advances by `window_size - overlap` each step, clamped
/// to a minimum of 1 so an overlap at or above the window size can never
/// stall or move backward. Chunk text is the window's lines joined and
/// trimmed; chunks that are empty after trimming are dropped, but line
/// accounting still advances. Production stops once the window start
/// reaches the end of the input.
#[must_use]
pub fn chunk_lines(lines: &[&str], window_size: usize, overlap: usize) -> Vec<Chunk> {
    if lines.is_empty() || window_size == 0 {
        return Vec::new();
    }

    let advance = window_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < lines.len() {
        let end = (start + window_size).min(lines.len());
        let text = lines[start..end].join("\n").trim().to_string();
        if !text.is_empty() {
            chunks.push(Chunk {
                text,
                start_line: start + 1,
                end_line: end,
            });
        }
        start += advance;
    }

    chunks
}
