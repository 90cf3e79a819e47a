//! Orchestrator configuration.

use docqa_rag::ContextOptions;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings for the research and planner agents.
///
/// `QaPipeline` takes its retrieval depth from the session's
/// [`RagConfig::top_k`](docqa_rag::RagConfig) instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Chunks retrieved per agent retrieval step. Never below 1.
    pub retrieve_k: usize,
    /// Upper bound on planner iterations.
    pub max_steps: usize,
    /// Per-chunk character budget in agent context.
    pub chunk_preview_chars: usize,
    /// Character cap on the context handed to summarize and action prompts.
    pub max_prompt_context_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            retrieve_k: 4,
            max_steps: 5,
            chunk_preview_chars: 1500,
            max_prompt_context_chars: 4000,
        }
    }
}

impl AgentConfig {
    /// Defaults, with `retrieve_k` taken from `RETRIEVE_K` when it parses.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var("RETRIEVE_K") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(k) => config.with_retrieve_k(k),
                Err(_) => {
                    warn!(value = %raw, "ignoring RETRIEVE_K that is not a positive integer");
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Set the retrieval depth, raising 0 to 1.
    pub fn with_retrieve_k(mut self, k: usize) -> Self {
        self.retrieve_k = k.max(1);
        self
    }

    /// Set the planner step limit.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_chunk_preview_chars(mut self, chars: usize) -> Self {
        self.chunk_preview_chars = chars;
        self
    }

    pub fn with_max_prompt_context_chars(mut self, chars: usize) -> Self {
        self.max_prompt_context_chars = chars;
        self
    }

    /// Context formatting for agent retrieval: numbered chunks, each cut to
    /// `chunk_preview_chars`.
    pub fn context_options(&self) -> ContextOptions {
        ContextOptions::default().numbered().with_max_chunk_chars(self.chunk_preview_chars)
    }
}
