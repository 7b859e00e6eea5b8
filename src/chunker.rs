//! Fixed-size overlapping token windows over a document.
//!
//! Chunking is the first step of index construction: each document is
//! split on whitespace and re-joined into windows of up to `size`
//! tokens, with consecutive windows sharing `overlap` tokens so that
//! sentences straddling a boundary stay retrievable from at least one
//! chunk.

use serde::{Deserialize, Serialize};

use crate::types::RagError;

/// Default window size in tokens.
pub const DEFAULT_CHUNK_SIZE: usize = 600;
/// Default overlap between consecutive windows in tokens.
pub const DEFAULT_CHUNK_OVERLAP: usize = 80;

/// Windowing parameters for [`make_chunks`].
///
/// `overlap` must be strictly smaller than `size`; [`validate`](Self::validate)
/// rejects anything else up front rather than letting the window loop
/// stall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk.
    pub size: usize,
    /// Tokens shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Create a config, rejecting degenerate window parameters.
    pub fn new(size: usize, overlap: usize) -> Result<Self, RagError> {
        let config = Self { size, overlap };
        config.validate()?;
        Ok(config)
    }

    /// Check that the window loop can make forward progress.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.size == 0 {
            return Err(RagError::Config("chunk size must be positive".to_string()));
        }
        if self.overlap >= self.size {
            return Err(RagError::Config(format!(
                "chunk overlap {} must be smaller than chunk size {}",
                self.overlap, self.size
            )));
        }
        Ok(())
    }
}

/// A contiguous token window of one source document.
///
/// `start_token..end_token` indexes into the document's whitespace
/// token sequence; `text` is those tokens re-joined with single spaces,
/// so original inter-token whitespace is not preserved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Window text, tokens joined with single spaces.
    pub text: String,
    /// Index of the first token in the window.
    pub start_token: usize,
    /// Index one past the last token in the window.
    pub end_token: usize,
}

/// Split `text` into overlapping token windows.
///
/// Windows start at token 0 and span up to `size` tokens; each
/// subsequent window starts `overlap` tokens before the previous one
/// ended. The last window may be shorter. Pure and deterministic — the
/// same input always yields the same chunk list.
///
/// # Errors
///
/// Returns [`RagError::Config`] when `overlap >= size` or `size == 0`,
/// before any chunk is produced.
///
/// # Examples
///
/// ```
/// use citesmith::chunker::make_chunks;
///
/// let chunks = make_chunks("a b c d e f g h i j", 4, 1).unwrap();
/// let ranges: Vec<_> = chunks.iter().map(|c| (c.start_token, c.end_token)).collect();
/// assert_eq!(ranges, vec![(0, 4), (3, 7), (6, 10)]);
/// ```
pub fn make_chunks(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>, RagError> {
    ChunkingConfig { size, overlap }.validate()?;

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < tokens.len() {
        let end = usize::min(tokens.len(), start + size);
        let body = tokens[start..end].join(" ");
        // split_whitespace never yields empty tokens, but the contract is
        // that pure-whitespace windows are dropped rather than emitted.
        if !body.trim().is_empty() {
            chunks.push(Chunk {
                text: body,
                start_token: start,
                end_token: end,
            });
        }
        if end == tokens.len() {
            break;
        }
        start = end.saturating_sub(overlap);
    }

    Ok(chunks)
}
