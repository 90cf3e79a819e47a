//! Configuration for chunking, retrieval and scoring.

use serde::{Deserialize, Serialize};

use crate::chunking::{FixedSizeChunker, validate_window};
use crate::error::{RagError, Result};
use crate::retrieval::ContextOptions;
use crate::scoring::{ConfidenceScorer, TrustWeights};

/// Configuration parameters for a document session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of nearest chunks to retrieve per query.
    pub top_k: usize,
    /// Optional per-chunk character budget when building prompt context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunk_chars: Option<usize>,
    /// Trust score weighting and label thresholds.
    #[serde(default)]
    pub trust: TrustWeights,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
            top_k: 5,
            max_chunk_chars: None,
            trust: TrustWeights::default(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_chunk_chars == Some(0)`
    /// - the trust weights are invalid
    pub fn validate(&self) -> Result<()> {
        validate_window(self.chunk_size, self.chunk_overlap)?;
        if self.top_k == 0 {
            return Err(RagError::InvalidConfiguration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.max_chunk_chars == Some(0) {
            return Err(RagError::InvalidConfiguration(
                "max_chunk_chars must be greater than zero when set".to_string(),
            ));
        }
        self.trust.validate()
    }

    /// The chunker described by this configuration.
    pub fn chunker(&self) -> Result<FixedSizeChunker> {
        FixedSizeChunker::new(self.chunk_size, self.chunk_overlap)
    }

    /// The trust scorer described by this configuration.
    pub fn scorer(&self) -> Result<ConfidenceScorer> {
        ConfidenceScorer::new(self.trust)
    }

    /// Context formatting for prompts built from this configuration.
    pub fn context_options(&self) -> ContextOptions {
        let options = ContextOptions::default();
        match self.max_chunk_chars {
            Some(budget) => options.with_max_chunk_chars(budget),
            None => options,
        }
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of nearest chunks to retrieve.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Truncate each chunk to `max_chars` characters when building context.
    pub fn max_chunk_chars(mut self, max_chars: usize) -> Self {
        self.config.max_chunk_chars = Some(max_chars);
        self
    }

    /// Set the trust weighting and thresholds.
    pub fn trust(mut self, weights: TrustWeights) -> Self {
        self.config.trust = weights;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_document_qa_settings() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 300);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_chunk_chars, None);
        assert_eq!(config.trust, TrustWeights::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_values() {
        let config = RagConfig::builder()
            .chunk_size(256)
            .chunk_overlap(32)
            .top_k(4)
            .max_chunk_chars(1500)
            .build()
            .unwrap();
        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.chunk_overlap, 32);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.context_options().max_chunk_chars, Some(1500));
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(RagConfig::builder().chunk_size(100).chunk_overlap(100).build().is_err());
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
        assert!(RagConfig::builder().top_k(0).build().is_err());
        assert!(RagConfig::builder().max_chunk_chars(0).build().is_err());
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let config: RagConfig =
            serde_json::from_str(r#"{"chunk_size": 120, "chunk_overlap": 20, "top_k": 3}"#)
                .unwrap();
        assert_eq!(config.chunk_size, 120);
        assert_eq!(config.trust, TrustWeights::default());
        assert!(config.validate().is_ok());
    }
}
