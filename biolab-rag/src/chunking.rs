//! Token-based text chunking.
//!
//! [`TokenChunker`] splits raw text into overlapping token-bounded segments
//! using the `cl100k_base` encoding, so chunk budgets line up with the
//! generation model's own token accounting. Chunking is deterministic:
//! the same text and parameters always produce the same chunk boundaries,
//! which keeps chunk ids stable across rebuilds.

use tiktoken_rs::CoreBPE;

use crate::error::{RagError, Result};

/// Default maximum tokens per chunk for free-text documents.
pub const DEFAULT_MAX_TOKENS: usize = 500;
/// Default token overlap between consecutive chunks.
pub const DEFAULT_OVERLAP: usize = 50;

/// Splits text into overlapping token windows.
///
/// Chunk *i* starts at token offset `i * (max_tokens - overlap)` and spans
/// at most `max_tokens` tokens; the last chunk may be shorter. `overlap`
/// must be strictly less than `max_tokens`, otherwise the window would not
/// advance.
pub struct TokenChunker {
    bpe: CoreBPE,
    max_tokens: usize,
    overlap: usize,
}

impl TokenChunker {
    /// Create a chunker with the given window size and overlap.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `overlap >= max_tokens`, and
    /// [`RagError::ChunkingError`] if the token encoding cannot be loaded.
    pub fn new(max_tokens: usize, overlap: usize) -> Result<Self> {
        if overlap >= max_tokens {
            return Err(RagError::ConfigError(format!(
                "overlap ({overlap}) must be less than max_tokens ({max_tokens})"
            )));
        }
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            RagError::ChunkingError(format!("failed to load cl100k_base encoding: {e}"))
        })?;
        Ok(Self { bpe, max_tokens, overlap })
    }

    /// Create a chunker with the default free-text policy (500/50).
    pub fn default_policy() -> Result<Self> {
        Self::new(DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP)
    }

    /// Split `text` into ordered, overlapping chunks.
    ///
    /// Returns an empty `Vec` for empty input.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if a token window cannot be
    /// decoded back to text.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = self.bpe.encode_ordinary(text);
        let step = self.max_tokens - self.overlap;

        let mut chunks = Vec::new();
        for (start, end) in window_ranges(tokens.len(), self.max_tokens, step) {
            let piece = self.bpe.decode(tokens[start..end].to_vec()).map_err(|e| {
                RagError::ChunkingError(format!("failed to decode tokens {start}..{end}: {e}"))
            })?;
            chunks.push(piece);
        }
        Ok(chunks)
    }

    /// Number of `cl100k_base` tokens in `text`.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Sliding-window ranges over `0..len`: each window spans `size` tokens
/// (clamped at `len`) and starts `step` after the previous one.
pub(crate) fn window_ranges(len: usize, size: usize, step: usize) -> Vec<(usize, usize)> {
    debug_assert!(step > 0);
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < len {
        ranges.push((start, (start + size).min(len)));
        start += step;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_ranges_cover_every_index() {
        for len in 0..60 {
            for size in 1..12 {
                for step in 1..=size {
                    let ranges = window_ranges(len, size, step);
                    let mut covered = vec![false; len];
                    for (start, end) in &ranges {
                        assert!(end <= &len);
                        for flag in &mut covered[*start..*end] {
                            *flag = true;
                        }
                    }
                    assert!(
                        covered.iter().all(|&c| c),
                        "uncovered index for len={len} size={size} step={step}"
                    );
                }
            }
        }
    }

    #[test]
    fn window_ranges_advance_by_step() {
        let ranges = window_ranges(1200, 500, 450);
        assert_eq!(ranges, vec![(0, 500), (450, 950), (900, 1200)]);
    }

    #[test]
    fn rejects_overlap_not_less_than_max_tokens() {
        assert!(matches!(TokenChunker::new(100, 100), Err(RagError::ConfigError(_))));
        assert!(matches!(TokenChunker::new(100, 150), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = TokenChunker::default_policy().unwrap();
        assert!(chunker.chunk("").unwrap().is_empty());
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunker = TokenChunker::default_policy().unwrap();
        let chunks = chunker.chunk("Hémogramme complet avec formule leucocytaire.").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "Hémogramme complet avec formule leucocytaire.");
    }
}
