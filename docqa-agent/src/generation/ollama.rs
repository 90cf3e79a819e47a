//! Ollama text generation via `/api/generate`.

use async_trait::async_trait;
use docqa_rag::ollama::DEFAULT_OLLAMA_URL;
use docqa_rag::{RagError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::TextGenerator;

const DEFAULT_MODEL: &str = "llama3:latest";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const PROVIDER: &str = "Ollama";

/// A [`TextGenerator`] backed by an Ollama server.
///
/// Requests are non-streaming; the whole completion is returned at once,
/// trimmed of surrounding whitespace.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_agent::OllamaGenerator;
///
/// let generator = OllamaGenerator::new().with_model("mistral");
/// let text = generator.generate("Say hello").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaGenerator {
    /// Create a generator for the default server and model.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Create a generator from `OLLAMA_URL` and `OLLAMA_MODEL`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Self {
        let mut generator = Self::new();
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            generator = generator.with_base_url(url);
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            generator = generator.with_model(model);
        }
        generator
    }

    /// Set the server address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "generating");

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: self.temperature },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::transport(PROVIDER, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::transport(PROVIDER, format!("API returned {status}: {body}")));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::malformed(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        Ok(body.response.trim().to_string())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
