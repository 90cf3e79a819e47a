//! Ollama embedding provider using the Ollama `/api/embed` endpoint.
//!
//! This module is only available when the `ollama` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default Ollama server address.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// The default embedding model (MiniLM-L6-v2, 384 dimensions).
const DEFAULT_MODEL: &str = "all-minilm";

const PROVIDER: &str = "Ollama";

/// An [`EmbeddingProvider`] backed by a local or remote Ollama server.
///
/// All texts of a batch are sent in a single request.
///
/// # Configuration
///
/// - `base_url`: defaults to `http://localhost:11434`, or `OLLAMA_URL`.
/// - `model`: defaults to `all-minilm`, or `OLLAMA_EMBED_MODEL`.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::ollama::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new().with_model("nomic-embed-text");
/// let vectors = provider.embed_batch(&["hello", "world"]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for OllamaEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaEmbeddingProvider {
    /// Create a provider for the default server and model.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.into(),
            model: DEFAULT_MODEL.into(),
        }
    }

    /// Create a provider from `OLLAMA_URL` and `OLLAMA_EMBED_MODEL`, falling
    /// back to the defaults for unset variables.
    pub fn from_env() -> Self {
        let mut provider = Self::new();
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            provider = provider.with_base_url(url);
        }
        if let Ok(model) = std::env::var("OLLAMA_EMBED_MODEL") {
            provider = provider.with_model(model);
        }
        provider
    }

    /// Set the server address (e.g. `http://gpu-box:11434`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The embedding model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::transport(PROVIDER, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::transport(PROVIDER, format!("API returned {status}: {detail}")));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::malformed(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(RagError::malformed(
                PROVIDER,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embed_response.embeddings.len()
                ),
            ));
        }

        Ok(embed_response.embeddings)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
