//! Trust scoring for generated answers.
//!
//! A [`TrustScore`] blends two signals:
//!
//! - retrieval confidence, `1 / (1 + mean distance)` of the chunks that
//!   formed the context
//! - context coverage, the share of the answer's distinct tokens that also
//!   appear in the context
//!
//! Coverage is a weak proxy (it penalises paraphrasing), so the default
//! weighting favours retrieval confidence.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Weights and label thresholds for [`ConfidenceScorer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    /// Weight of retrieval confidence in the combined score.
    pub retrieval_weight: f32,
    /// Weight of context coverage in the combined score.
    pub coverage_weight: f32,
    /// Combined scores strictly above this are High Trust.
    pub high_threshold: f32,
    /// Combined scores strictly above this (and not High) are Medium Trust.
    pub medium_threshold: f32,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            retrieval_weight: 0.7,
            coverage_weight: 0.3,
            high_threshold: 0.65,
            medium_threshold: 0.45,
        }
    }
}

impl TrustWeights {
    /// Check that weights are non-negative and thresholds ordered in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in
            [("retrieval_weight", self.retrieval_weight), ("coverage_weight", self.coverage_weight)]
        {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RagError::InvalidConfiguration(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        for (name, threshold) in
            [("high_threshold", self.high_threshold), ("medium_threshold", self.medium_threshold)]
        {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(RagError::InvalidConfiguration(format!(
                    "{name} must be within [0, 1], got {threshold}"
                )));
            }
        }
        if self.medium_threshold > self.high_threshold {
            return Err(RagError::InvalidConfiguration(format!(
                "medium_threshold ({}) must not exceed high_threshold ({})",
                self.medium_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

/// Categorical reading of a combined trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustLabel {
    /// Combined score above the high threshold.
    #[serde(rename = "High Trust")]
    High,
    /// Combined score above the medium threshold.
    #[serde(rename = "Medium Trust")]
    Medium,
    /// Everything else.
    #[serde(rename = "Low Trust")]
    Low,
}

impl TrustLabel {
    /// Display text for the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High Trust",
            Self::Medium => "Medium Trust",
            Self::Low => "Low Trust",
        }
    }
}

impl fmt::Display for TrustLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reliability estimate for a generated answer. Every field is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// `1 / (1 + mean distance)` of the supporting chunks.
    pub retrieval_confidence: f32,
    /// Share of distinct answer tokens found in the context.
    pub context_coverage: f32,
    /// Weighted blend of the two.
    pub combined_score: f32,
    /// Band the combined score falls into.
    pub label: TrustLabel,
}

/// Computes [`TrustScore`]s with a fixed set of [`TrustWeights`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfidenceScorer {
    weights: TrustWeights,
}

impl ConfidenceScorer {
    /// Create a scorer, validating the weights.
    ///
    /// # Errors
    ///
    /// See [`TrustWeights::validate`].
    pub fn new(weights: TrustWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// The weights in use.
    pub fn weights(&self) -> &TrustWeights {
        &self.weights
    }

    /// Score `answer` against the `context` it was generated from.
    ///
    /// `distances` are the retrieval distances of the chunks in `context`.
    pub fn score(&self, answer: &str, context: &str, distances: &[f32]) -> TrustScore {
        let retrieval_confidence = retrieval_confidence(distances);
        let context_coverage = context_coverage(answer, context);
        let combined_score = (self.weights.retrieval_weight * retrieval_confidence
            + self.weights.coverage_weight * context_coverage)
            .clamp(0.0, 1.0);

        TrustScore {
            retrieval_confidence,
            context_coverage,
            combined_score,
            label: self.label(combined_score),
        }
    }

    /// Band a combined score. Comparisons are strict, so a score exactly on
    /// a threshold falls into the lower band.
    pub fn label(&self, combined_score: f32) -> TrustLabel {
        if combined_score > self.weights.high_threshold {
            TrustLabel::High
        } else if combined_score > self.weights.medium_threshold {
            TrustLabel::Medium
        } else {
            TrustLabel::Low
        }
    }
}

/// `1 / (1 + mean(distances))`, clamped to `[0, 1]`.
///
/// No distances means no retrieval evidence, which scores 0.
pub fn retrieval_confidence(distances: &[f32]) -> f32 {
    if distances.is_empty() {
        return 0.0;
    }
    let mean = distances.iter().sum::<f32>() / distances.len() as f32;
    if mean.is_nan() {
        return 0.0;
    }
    (1.0 / (1.0 + mean.max(0.0))).clamp(0.0, 1.0)
}

/// Share of distinct lower-cased whitespace tokens of `answer` that appear
/// in `context`. An empty answer has zero coverage.
pub fn context_coverage(answer: &str, context: &str) -> f32 {
    let answer_tokens = token_set(answer);
    if answer_tokens.is_empty() {
        return 0.0;
    }
    let context_tokens = token_set(context);
    let overlap = answer_tokens.intersection(&context_tokens).count();
    overlap as f32 / answer_tokens.len() as f32
}

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Score with the default [`TrustWeights`].
pub fn score_trust(answer: &str, context: &str, distances: &[f32]) -> TrustScore {
    ConfidenceScorer::default().score(answer, context, distances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_high_threshold_is_medium() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.label(0.65), TrustLabel::Medium);
        assert_eq!(scorer.label(0.650_001), TrustLabel::High);
    }

    #[test]
    fn exact_medium_threshold_is_low() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.label(0.45), TrustLabel::Low);
        assert_eq!(scorer.label(0.450_001), TrustLabel::Medium);
    }

    #[test]
    fn combined_score_of_exactly_high_threshold_is_medium() {
        let weights =
            TrustWeights { retrieval_weight: 0.65, coverage_weight: 0.0, ..Default::default() };
        let score = ConfidenceScorer::new(weights).unwrap().score("", "", &[0.0]);
        assert_eq!(score.combined_score, 0.65);
        assert_eq!(score.label, TrustLabel::Medium);
    }

    #[test]
    fn empty_answer_has_zero_coverage() {
        assert_eq!(context_coverage("", "any context at all"), 0.0);
        assert_eq!(context_coverage("   \n\t", "any context"), 0.0);
    }

    #[test]
    fn coverage_is_case_insensitive_and_deduplicated() {
        // {the, cat, sat} vs {the, cat, slept}: 2 of 3 tokens covered
        let coverage = context_coverage("The cat the CAT sat", "the cat slept");
        assert!((coverage - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn retrieval_confidence_from_mean_distance() {
        assert_eq!(retrieval_confidence(&[0.0, 0.0]), 1.0);
        assert!((retrieval_confidence(&[0.5, 1.5]) - 0.5).abs() < 1e-6);
        assert_eq!(retrieval_confidence(&[]), 0.0);
        assert_eq!(retrieval_confidence(&[f32::NAN]), 0.0);
        assert_eq!(retrieval_confidence(&[f32::INFINITY]), 0.0);
    }

    #[test]
    fn default_weighting() {
        // confidence 0.5, coverage 0.5 -> 0.35 + 0.15
        let score = score_trust("alpha beta", "alpha gamma", &[1.0]);
        assert!((score.retrieval_confidence - 0.5).abs() < 1e-6);
        assert!((score.context_coverage - 0.5).abs() < 1e-6);
        assert!((score.combined_score - 0.5).abs() < 1e-6);
        assert_eq!(score.label, TrustLabel::Medium);
    }

    #[test]
    fn perfect_retrieval_and_coverage_is_high_trust() {
        let score = score_trust("answer text", "the answer text is here", &[0.0]);
        assert_eq!(score.combined_score, 1.0);
        assert_eq!(score.label, TrustLabel::High);
    }

    #[test]
    fn label_display_matches_serde_name() {
        assert_eq!(TrustLabel::High.to_string(), "High Trust");
        assert_eq!(serde_json::to_string(&TrustLabel::Low).unwrap(), "\"Low Trust\"");
    }

    #[test]
    fn rejects_inverted_thresholds_and_negative_weights() {
        let inverted =
            TrustWeights { high_threshold: 0.3, medium_threshold: 0.6, ..Default::default() };
        assert!(matches!(inverted.validate(), Err(RagError::InvalidConfiguration(_))));
        let negative = TrustWeights { coverage_weight: -0.1, ..Default::default() };
        assert!(ConfidenceScorer::new(negative).is_err());
        assert!(TrustWeights::default().validate().is_ok());
    }
}
