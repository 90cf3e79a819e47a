//! Deterministic embedding providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docqa_rag::{EmbeddingProvider, Result};

/// Embeds text as the relative frequency of each ASCII letter `a..=z`.
///
/// Texts made of different letters land far apart; texts with the same
/// letter mix land on the same point. Records every batch it receives.
#[derive(Default)]
pub struct LetterHistogramEmbedder {
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
}

impl LetterHistogramEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn histogram(text: &str) -> Vec<f32> {
        let mut counts = vec![0.0f32; 26];
        let mut total = 0.0f32;
        for c in text.chars().filter(char::is_ascii_lowercase) {
            counts[(c as u8 - b'a') as usize] += 1.0;
            total += 1.0;
        }
        if total > 0.0 {
            counts.iter_mut().for_each(|v| *v /= total);
        }
        counts
    }
}

#[async_trait]
impl EmbeddingProvider for LetterHistogramEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(texts.iter().map(|t| t.to_string()).collect());
        Ok(texts.iter().map(|t| Self::histogram(t)).collect())
    }

    fn name(&self) -> &str {
        "letter-histogram"
    }
}

/// Returns a fixed number of dimensions regardless of input, for
/// exercising dimension checks.
pub struct FixedWidthEmbedder {
    pub width: usize,
}

#[async_trait]
impl EmbeddingProvider for FixedWidthEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| vec![t.len() as f32; self.width]).collect())
    }
}

/// Drops the last vector of every batch.
pub struct ShortBatchEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }

    fn name(&self) -> &str {
        "short-batch"
    }
}

/// Six hundred characters: 300 'a', then 300 'b'.
///
/// With `size = 300, overlap = 50` the chunks are all-'a', mixed, and
/// all-'b', which the histogram embedder keeps well apart.
pub fn two_letter_document() -> String {
    format!("{}{}", "a".repeat(300), "b".repeat(300))
}
