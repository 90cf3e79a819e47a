//! Single-shot grounded question answering.

use std::sync::Arc;

use docqa_rag::{DocumentSession, RagError, SearchResult, TrustScore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{Result, Stage, StageError};
use crate::generation::TextGenerator;
use crate::prompt;

/// Chunk `text` into `session` and index it, labelling failures by stage.
///
/// Text with no readable content (empty or whitespace only) fails at
/// [`Stage::Chunking`] before anything is embedded; everything else that goes
/// wrong while building fails at [`Stage::Indexing`].
pub async fn load_document(session: &mut DocumentSession, text: &str) -> Result<usize> {
    if text.trim().is_empty() {
        return Err(StageError::new(Stage::Chunking, RagError::EmptyInput));
    }
    session.load_text(text).await.map_err(|e| match e {
        RagError::EmptyInput => StageError::new(Stage::Chunking, e),
        other => StageError::new(Stage::Indexing, other),
    })
}

/// A grounded answer with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnswer {
    pub question: String,
    pub answer: String,
    /// The context the answer was generated from.
    pub context: String,
    /// The retrieved chunks, nearest first.
    pub results: Vec<SearchResult>,
    pub trust: TrustScore,
}

/// Retrieve, prompt, generate, score.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = QaPipeline::new(Arc::new(OllamaGenerator::from_env()));
/// let answer = pipeline.ask(&session, "Who signed the contract?").await?;
/// println!("{} [{}]", answer.answer, answer.trust.label);
/// ```
#[derive(Clone)]
pub struct QaPipeline {
    generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for QaPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaPipeline").field("generator", &self.generator.name()).finish()
    }
}

impl QaPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Answer `question` from the document loaded in `session`.
    ///
    /// Retrieves the session's `top_k` chunks, joins them with blank lines,
    /// generates an answer from the grounded prompt and scores it.
    ///
    /// # Errors
    ///
    /// - [`Stage::Retrieval`] if no document is loaded or the query cannot
    ///   be embedded.
    /// - [`Stage::Generation`] if the model call fails.
    #[instrument(skip_all, fields(session.id = %session.id()))]
    pub async fn ask(&self, session: &DocumentSession, question: &str) -> Result<QaAnswer> {
        let results = session.retrieve(question).await.map_err(StageError::at(Stage::Retrieval))?;
        let context = results.to_context(&session.config().context_options());

        let answer = self
            .generator
            .generate(&prompt::grounded_answer(&context, question))
            .await
            .map_err(StageError::at(Stage::Generation))?;

        let trust = session.score_trust(&answer, &context, &results.distances());
        info!(
            result_count = results.len(),
            combined_score = trust.combined_score,
            label = %trust.label,
            "answered question"
        );

        Ok(QaAnswer {
            question: question.to_string(),
            answer,
            context,
            results: results.into_results(),
            trust,
        })
    }
}
