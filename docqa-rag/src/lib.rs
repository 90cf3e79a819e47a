//! # docqa-rag
//!
//! The retrieval engine behind docqa's document question answering.
//!
//! - [`FixedSizeChunker`] splits text into overlapping character windows
//! - [`EmbeddingProvider`] is the text → vector capability
//! - [`VectorIndex`] stores chunk vectors and answers k-NN queries by
//!   squared Euclidean distance
//! - [`IndexHandle`] pairs an index with its embedder for querying
//! - [`ConfidenceScorer`] turns distances and lexical overlap into a
//!   [`TrustScore`]
//! - [`DocumentSession`] owns all of the above for one document
//!
//! ## Features
//!
//! - `ollama`: [`ollama::OllamaEmbeddingProvider`] over the Ollama HTTP API
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{DocumentSession, RagConfig};
//!
//! let mut session = DocumentSession::new(Arc::new(embedder), RagConfig::default())?;
//! session.load_text(&document_text).await?;
//!
//! let results = session.retrieve("What are the main risks?").await?;
//! let context = results.to_context(&Default::default());
//! let trust = session.score_trust(&answer, &context, &results.distances());
//! println!("{} ({:.2})", trust.label, trust.combined_score);
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod retrieval;
pub mod scoring;
pub mod session;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use chunking::{Chunker, FixedSizeChunker, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, EmbeddedChunk, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{VectorIndex, squared_l2};
pub use retrieval::{
    ContextOptions, IndexHandle, RetrievalResult, RetrievedContext, TRUNCATION_MARKER,
    build_index, retrieve, truncate_chars,
};
pub use scoring::{
    ConfidenceScorer, TrustLabel, TrustScore, TrustWeights, context_coverage,
    retrieval_confidence, score_trust,
};
pub use session::DocumentSession;
