//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Chunking or scoring parameters are inconsistent (for example
    /// `chunk_overlap >= chunk_size`).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An index was built from zero chunks.
    #[error("Empty input: cannot build an index from zero chunks")]
    EmptyInput,

    /// A search was attempted before any index was built.
    #[error("Index not built: load a document before retrieving")]
    NotBuilt,

    /// A vector's length does not match the index dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the stored vectors.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// A call to an external capability failed or returned a non-success status.
    #[error("Transport failure ({provider}): {message}")]
    Transport {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An external capability answered, but its output could not be used.
    #[error("Malformed response ({provider}): {message}")]
    MalformedResponse {
        /// The provider that produced the response.
        provider: String,
        /// A description of what was wrong with it.
        message: String,
    },
}

impl RagError {
    /// Shorthand for a [`RagError::Transport`] error.
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport { provider: provider.into(), message: message.into() }
    }

    /// Shorthand for a [`RagError::MalformedResponse`] error.
    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse { provider: provider.into(), message: message.into() }
    }

    /// Whether retrying the same call can succeed.
    ///
    /// Only transport failures are recoverable. Configuration and
    /// precondition errors fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
