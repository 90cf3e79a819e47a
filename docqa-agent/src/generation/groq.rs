//! Groq text generation via the OpenAI-compatible chat completions API.

use async_trait::async_trait;
use docqa_rag::{RagError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::TextGenerator;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const SYSTEM_PROMPT: &str = "You answer strictly from provided context.";
const PROVIDER: &str = "Groq";

/// A [`TextGenerator`] backed by the Groq API.
///
/// # Configuration
///
/// - `api_key`: from the constructor or `GROQ_API_KEY`.
/// - `model`: defaults to `llama-3.1-8b-instant`, or `GROQ_MODEL`.
/// - `temperature`: defaults to 0.2, or `GROQ_TEMPERATURE`.
#[derive(Debug, Clone)]
pub struct GroqGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqGenerator {
    /// Create a generator with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::InvalidConfiguration("Groq API key must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key,
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Create a generator from `GROQ_API_KEY`, `GROQ_MODEL` and
    /// `GROQ_TEMPERATURE`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if the key is unset or the
    /// temperature is not a number.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            RagError::InvalidConfiguration("GROQ_API_KEY environment variable not set".into())
        })?;
        let mut generator = Self::new(api_key)?;
        if let Ok(model) = std::env::var("GROQ_MODEL") {
            generator = generator.with_model(model);
        }
        if let Ok(raw) = std::env::var("GROQ_TEMPERATURE") {
            let temperature = raw.parse::<f32>().map_err(|_| {
                RagError::InvalidConfiguration(format!("GROQ_TEMPERATURE is not a number: {raw}"))
            })?;
            generator = generator.with_temperature(temperature);
        }
        Ok(generator)
    }

    /// Point at a different OpenAI-compatible endpoint.
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

// ── Chat completions request/response types ────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl TextGenerator for GroqGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "generating");

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::transport(PROVIDER, format!("API returned {status}: {detail}")));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::malformed(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| RagError::malformed(PROVIDER, "response contained no message content"))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
