//! Stage-labelled errors for user-facing reporting.

use std::fmt;

use docqa_rag::RagError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A step of the document question-answering flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Getting text out of the uploaded document.
    Extraction,
    /// Splitting text into chunks.
    Chunking,
    /// Embedding chunks and building the index.
    Indexing,
    /// Embedding a query and searching the index.
    Retrieval,
    /// Calling the language model.
    Generation,
}

impl Stage {
    /// Lower-case stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Chunking => "chunking",
            Self::Indexing => "indexing",
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`RagError`] tagged with the stage it happened in.
///
/// Displays as a single plain-text line, e.g.
/// `generation failed: Transport failure (Ollama): API returned 500 ...`.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    /// Where the failure happened.
    pub stage: Stage,
    /// What went wrong.
    #[source]
    pub source: RagError,
}

impl StageError {
    /// Tag `source` with `stage`.
    pub fn new(stage: Stage, source: RagError) -> Self {
        Self { stage, source }
    }

    /// A closure for `map_err` that tags errors with `stage`.
    pub fn at(stage: Stage) -> impl FnOnce(RagError) -> Self {
        move |source| Self::new(stage, source)
    }

    /// Whether the caller may retry (only transport failures qualify).
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// A convenience result type for orchestration.
pub type Result<T> = std::result::Result<T, StageError>;
