//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that maps text to fixed-dimension dense vectors.
///
/// The same provider must embed both the corpus and the queries, otherwise
/// distances between them are meaningless. Implementations must be
/// deterministic for a fixed model and return vectors of one dimensionality
/// for the lifetime of a session.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let vectors = provider.embed_batch(&["hello", "world"]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate one embedding vector per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding for a single text as a one-item batch.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text]).await?.into_iter().next().ok_or_else(|| {
            RagError::malformed(self.name(), "provider returned no vector for a one-item batch")
        })
    }

    /// Human-readable provider name used in logs and errors.
    fn name(&self) -> &str {
        "embedding"
    }
}
