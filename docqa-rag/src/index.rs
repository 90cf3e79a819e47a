//! In-memory vector index using brute-force squared Euclidean distance.
//!
//! [`VectorIndex`] keeps embedded chunks in insertion order; the position of
//! a vector in the index is the only link back to its chunk. Corpora are a
//! single document, so every search scans every vector.

use tracing::{debug, info};

use crate::document::{Chunk, EmbeddedChunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::retrieval::RetrievalResult;

/// An append-only collection of embedded chunks supporting k-NN search.
///
/// A freshly constructed index is *unbuilt*: [`search`](VectorIndex::search)
/// fails with [`RagError::NotBuilt`] until [`build`](VectorIndex::build)
/// succeeds. A built index always holds at least one chunk.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::VectorIndex;
///
/// let mut index = VectorIndex::new();
/// index.build(chunks, &embedder).await?;
/// let results = index.search(&query_embedding, 5)?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Create a new, unbuilt index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index directly from chunks that already carry embeddings.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyInput`] if `entries` is empty.
    /// - [`RagError::MalformedResponse`] if the first embedding is empty.
    /// - [`RagError::DimensionMismatch`] if embeddings differ in length.
    pub fn from_embedded(entries: Vec<EmbeddedChunk>) -> Result<Self> {
        let first = entries.first().ok_or(RagError::EmptyInput)?;
        let dimensions = first.embedding.len();
        if dimensions == 0 {
            return Err(RagError::malformed("index", "embeddings must not be empty"));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(RagError::DimensionMismatch {
                expected: dimensions,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self { entries, dimensions: Some(dimensions) })
    }

    /// Embed `chunks` in one batched call and replace the index contents.
    ///
    /// Previous contents are discarded before embedding starts, so a failed
    /// build leaves the index unbuilt rather than serving a stale document.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyInput`] if `chunks` is empty.
    /// - Any error from the embedding provider.
    /// - [`RagError::MalformedResponse`] if the provider returns a different
    ///   number of vectors than chunks.
    /// - [`RagError::DimensionMismatch`] if vectors differ in length.
    pub async fn build(
        &mut self,
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<()> {
        *self = Self::new();
        if chunks.is_empty() {
            return Err(RagError::EmptyInput);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::malformed(
                embedder.name(),
                format!("expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            ));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();
        *self = Self::from_embedded(entries)?;

        info!(
            chunk_count = self.len(),
            dimensions = self.dimensions.unwrap_or_default(),
            provider = embedder.name(),
            "built vector index"
        );
        Ok(())
    }

    /// Whether a successful build has happened.
    pub fn is_built(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks (only true when unbuilt).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of stored vectors, if built.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Indexed chunks in insertion order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Return the `k` chunks nearest to `query` by squared Euclidean distance.
    ///
    /// `k` larger than the number of stored chunks is clamped. Equal
    /// distances keep insertion order, so the earlier chunk ranks first.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotBuilt`] if called before a successful build.
    /// - [`RagError::DimensionMismatch`] if `query` has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult> {
        let dimensions = self.dimensions.ok_or(RagError::NotBuilt)?;
        if query.len() != dimensions {
            return Err(RagError::DimensionMismatch { expected: dimensions, actual: query.len() });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, squared_l2(&entry.embedding, query)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k.min(self.entries.len()));

        debug!(k, returned = scored.len(), "vector search");

        Ok(RetrievalResult::new(
            scored
                .into_iter()
                .map(|(position, distance)| SearchResult {
                    chunk: self.entries[position].chunk.clone(),
                    distance,
                })
                .collect(),
        ))
    }
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
