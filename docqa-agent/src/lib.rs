//! # docqa-agent
//!
//! Question answering and research agents over a [`docqa_rag::DocumentSession`].
//!
//! - [`QaPipeline`] answers one question from the retrieved context and
//!   scores the answer
//! - [`ResearchAgent`] runs a fixed plan, retrieve, summarize and
//!   action-item workflow
//! - [`PlannerAgent`] lets the model pick `RETRIEVE_CONTEXT`, `ANSWER` or
//!   `FINISH` one step at a time
//!
//! All three talk to a language model through [`TextGenerator`]. Failures
//! come back as a [`StageError`] naming the step that failed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_agent::{OllamaGenerator, QaPipeline, load_document};
//! use docqa_rag::{DocumentSession, RagConfig, ollama::OllamaEmbeddingProvider};
//!
//! let mut session =
//!     DocumentSession::new(Arc::new(OllamaEmbeddingProvider::from_env()), RagConfig::default())?;
//! load_document(&mut session, &text).await?;
//!
//! let pipeline = QaPipeline::new(Arc::new(OllamaGenerator::from_env()));
//! let answer = pipeline.ask(&session, "What is the notice period?").await?;
//! println!("{}\n{} ({:.2})", answer.answer, answer.trust.label, answer.trust.combined_score);
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod memory;
pub mod planner;
pub mod prompt;
pub mod qa;
pub mod research;

pub use config::AgentConfig;
pub use error::{Result, Stage, StageError};
pub use generation::{GeneratorBackend, GroqGenerator, OllamaGenerator, TextGenerator};
pub use memory::{AgentMemory, MemoryStep};
pub use planner::{
    AgentAction, PlannerAgent, PlannerAnswer, PlannerOutcome, PlannerReply, PlannerRun,
    parse_action,
};
pub use qa::{QaAnswer, QaPipeline, load_document};
pub use research::{AgentReport, ResearchAgent, plan_steps};
