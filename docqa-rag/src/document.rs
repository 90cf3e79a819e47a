//! Data types for chunks and search results.

use serde::{Deserialize, Serialize};

/// A contiguous window of a source document.
///
/// `start` and `end` are character offsets (not bytes) into the original
/// text, forming the half-open range `[start, end)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the chunker's output.
    pub index: usize,
    /// The text content of the chunk.
    pub text: String,
    /// Character offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

impl Chunk {
    /// Number of characters covered by this chunk.
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// A [`Chunk`] paired with its vector embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedChunk {
    /// The source chunk.
    pub chunk: Chunk,
    /// The vector embedding for the chunk's text.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with its distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query (lower is more relevant).
    pub distance: f32,
}
