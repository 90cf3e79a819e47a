//! Document chunking.
//!
//! Chunking is purely positional: a fixed-size window slides over the text
//! and consecutive windows share `chunk_overlap` characters. Callers that
//! need sentence- or paragraph-aware chunks must pre-segment the text.

use crate::document::Chunk;
use crate::error::{RagError, Result};

/// A strategy for splitting text into chunks.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks.
    ///
    /// Returns an empty `Vec` if `text` is empty.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// The final chunk may be shorter than `chunk_size`; it is never padded.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(300, 50)?;
/// let chunks = chunker.chunk(&"a".repeat(600));
/// assert_eq!(chunks.len(), 3);
/// assert_eq!((chunks[1].start, chunks[1].end), (250, 550));
/// # Ok::<(), docqa_rag::RagError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of characters shared by consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`, since the window would never advance.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(Chunk {
                index: chunks.len(),
                text: text[boundaries[start]..boundaries[end]].to_string(),
                start,
                end,
            });
            // Any later window would lie inside this one.
            if end == char_count {
                break;
            }
            start += self.step();
        }

        chunks
    }
}

/// Split `text` into overlapping fixed-size chunks.
///
/// # Errors
///
/// Returns [`RagError::InvalidConfiguration`] if `size == 0` or
/// `overlap >= size`.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(FixedSizeChunker::new(size, overlap)?.chunk(text))
}

pub(crate) fn validate_window(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::InvalidConfiguration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::InvalidConfiguration(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}
