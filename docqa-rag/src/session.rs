//! Per-document retrieval session.
//!
//! A [`DocumentSession`] owns one embedding provider handle and, once a
//! document is loaded, one [`IndexHandle`]. Loading another document
//! replaces the index wholesale. Sessions share nothing, so a host serving
//! several users creates one session per user.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::retrieval::{IndexHandle, RetrievalResult, RetrievedContext};
use crate::scoring::{ConfidenceScorer, TrustScore};

/// Retrieval state for one uploaded document.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{DocumentSession, RagConfig};
///
/// let mut session = DocumentSession::new(Arc::new(embedder), RagConfig::default())?;
/// session.load_text(&text).await?;
/// let results = session.retrieve("What does the report recommend?").await?;
/// ```
pub struct DocumentSession {
    id: Uuid,
    config: RagConfig,
    chunker: FixedSizeChunker,
    scorer: ConfidenceScorer,
    embedder: Arc<dyn EmbeddingProvider>,
    handle: Option<IndexHandle>,
}

impl fmt::Debug for DocumentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSession")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("handle", &self.handle)
            .finish()
    }
}

impl DocumentSession {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: RagConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            chunker: config.chunker()?,
            scorer: config.scorer()?,
            config,
            embedder,
            handle: None,
        })
    }

    /// Unique session identifier, used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Number of chunks in the loaded document, or 0 if none is loaded.
    pub fn chunk_count(&self) -> usize {
        self.handle.as_ref().map_or(0, |h| h.index().len())
    }

    /// Chunk `text` and build a fresh index over it, replacing any previous
    /// document. Returns the number of chunks indexed.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyInput`] if `text` produces no chunks.
    /// - Any error from building the index.
    pub async fn load_text(&mut self, text: &str) -> Result<usize> {
        self.handle = None;

        let chunks = self.chunker.chunk(text);
        info!(session.id = %self.id, chunk_count = chunks.len(), "chunked document");

        let handle = IndexHandle::build(chunks, self.embedder.clone()).await.map_err(|e| {
            error!(session.id = %self.id, error = %e, "index build failed");
            e
        })?;
        let chunk_count = handle.index().len();
        self.handle = Some(handle);
        Ok(chunk_count)
    }

    /// The index of the loaded document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotBuilt`] if no document is loaded.
    pub fn handle(&self) -> Result<&IndexHandle> {
        self.handle.as_ref().ok_or(RagError::NotBuilt)
    }

    /// Retrieve the configured `top_k` chunks nearest to `query`.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        self.retrieve_with_k(query, self.config.top_k).await
    }

    /// Retrieve the `k` chunks nearest to `query`.
    pub async fn retrieve_with_k(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        self.handle()?.retrieve(query, k).await
    }

    /// Retrieve and format context using the configured context options.
    pub async fn retrieve_context(&self, query: &str, k: usize) -> Result<RetrievedContext> {
        self.handle()?.retrieve_context(query, k, &self.config.context_options()).await
    }

    /// Score an answer with the session's trust weights.
    pub fn score_trust(&self, answer: &str, context: &str, distances: &[f32]) -> TrustScore {
        self.scorer.score(answer, context, distances)
    }
}
