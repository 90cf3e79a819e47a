//! Test doubles shared by the agent integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docqa_agent::TextGenerator;
use docqa_rag::{DocumentSession, EmbeddingProvider, RagConfig, RagError, Result};

/// Embeds text as the relative frequency of each ASCII letter `a..=z`.
pub struct LetterHistogramEmbedder;

#[async_trait]
impl EmbeddingProvider for LetterHistogramEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut counts = vec![0.0f32; 26];
                let letters: Vec<u8> =
                    text.bytes().filter(|b| b.is_ascii_lowercase()).collect();
                for b in &letters {
                    counts[(b - b'a') as usize] += 1.0;
                }
                if !letters.is_empty() {
                    let total = letters.len() as f32;
                    counts.iter_mut().for_each(|v| *v /= total);
                }
                counts
            })
            .collect())
    }
}

/// Answers every batch with zero-length vectors.
pub struct ZeroWidthEmbedder;

#[async_trait]
impl EmbeddingProvider for ZeroWidthEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| Vec::new()).collect())
    }
}

/// Replays canned replies in order and records every prompt it was given.
///
/// Once the script runs out every call fails with a transport error.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::default(),
        })
    }

    pub fn failing(error: RagError) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::default(),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RagError::transport("scripted", "script exhausted")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Six hundred characters: 300 'a', then 300 'b'.
///
/// With the default chunking the chunks are all-'a', mixed, and all-'b'.
pub fn two_letter_document() -> String {
    format!("{}{}", "a".repeat(300), "b".repeat(300))
}

/// A session over [`two_letter_document`] with the given config.
pub async fn loaded_session(config: RagConfig) -> DocumentSession {
    let mut session = DocumentSession::new(Arc::new(LetterHistogramEmbedder), config).unwrap();
    session.load_text(&two_letter_document()).await.unwrap();
    session
}
