//! Text generation backends.
//!
//! The orchestrator only needs `generate(prompt) -> text`; [`TextGenerator`]
//! is that capability. Two HTTP backends are provided:
//!
//! - [`OllamaGenerator`]: a local Ollama server (`/api/generate`)
//! - [`GroqGenerator`]: Groq's OpenAI-compatible chat completions API

mod groq;
mod ollama;

use std::sync::Arc;

use async_trait::async_trait;
use docqa_rag::Result;
use serde::{Deserialize, Serialize};

pub use groq::GroqGenerator;
pub use ollama::OllamaGenerator;

/// A language model reduced to a single text-completion call.
///
/// Implementations return [`RagError::Transport`](docqa_rag::RagError::Transport)
/// when the call fails or the backend answers with a non-success status, and
/// [`RagError::MalformedResponse`](docqa_rag::RagError::MalformedResponse)
/// when the answer cannot be read. No implementation retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt` and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Human-readable backend name used in logs and errors.
    fn name(&self) -> &str;
}

/// Which generation backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    /// A local Ollama server.
    #[default]
    Ollama,
    /// The Groq cloud API.
    Groq,
}

impl GeneratorBackend {
    /// Build the backend from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`](docqa_rag::RagError::InvalidConfiguration)
    /// when a required variable is missing or unparseable.
    pub fn generator_from_env(self) -> Result<Arc<dyn TextGenerator>> {
        Ok(match self {
            Self::Ollama => Arc::new(OllamaGenerator::from_env()),
            Self::Groq => Arc::new(GroqGenerator::from_env()?),
        })
    }
}
