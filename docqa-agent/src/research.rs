//! Fixed-workflow research agent: plan, retrieve, summarize, extract actions.

use std::sync::Arc;

use docqa_rag::{DocumentSession, RetrievedContext, TrustScore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::AgentConfig;
use crate::error::{Result, Stage, StageError};
use crate::generation::TextGenerator;
use crate::prompt;

/// Everything one research run produced.
///
/// When retrieval finds nothing, `context` is [`RetrievedContext::Empty`] and
/// the generated fields are `None`; no model call was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    pub goal: String,
    pub plan: Vec<String>,
    pub context: RetrievedContext,
    pub summary: Option<String>,
    pub actions: Option<String>,
    /// Trust in the summary, scored against the retrieved context.
    pub trust: Option<TrustScore>,
}

impl AgentReport {
    /// Whether retrieval produced any context.
    pub fn has_context(&self) -> bool {
        matches!(self.context, RetrievedContext::Found { .. })
    }
}

/// The steps a research run follows for `goal`.
pub fn plan_steps(goal: &str) -> Vec<String> {
    vec![
        format!("Retrieve relevant document context for the goal: {goal}"),
        "Perform document-grounded analysis".to_string(),
        "Summarize findings".to_string(),
        "Extract risks, opportunities, or actions".to_string(),
    ]
}

/// Runs the research workflow against a loaded [`DocumentSession`].
#[derive(Clone)]
pub struct ResearchAgent {
    generator: Arc<dyn TextGenerator>,
    config: AgentConfig,
}

impl std::fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ResearchAgent {
    pub fn new(generator: Arc<dyn TextGenerator>, config: AgentConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Plan, retrieve `retrieve_k` chunks for `goal`, then summarize and
    /// extract action items from them.
    ///
    /// # Errors
    ///
    /// - [`Stage::Retrieval`] if no document is loaded or the goal cannot be
    ///   embedded.
    /// - [`Stage::Generation`] if either model call fails.
    #[instrument(skip_all, fields(session.id = %session.id()))]
    pub async fn run(&self, session: &DocumentSession, goal: &str) -> Result<AgentReport> {
        let plan = plan_steps(goal);
        info!(steps = plan.len(), "planned research run");

        let handle = session.handle().map_err(StageError::at(Stage::Retrieval))?;
        let context = handle
            .retrieve_context(goal, self.config.retrieve_k, &self.config.context_options())
            .await
            .map_err(StageError::at(Stage::Retrieval))?;

        let mut report = self.analyze(goal, context).await?;
        if let (Some(summary), RetrievedContext::Found { context, distances }) =
            (&report.summary, &report.context)
        {
            report.trust = Some(session.score_trust(summary, context, distances));
        }
        report.plan = plan;
        Ok(report)
    }

    /// Summarize and extract actions from already retrieved `context`.
    ///
    /// The returned report has the default plan and no trust score.
    pub async fn analyze(&self, goal: &str, context: RetrievedContext) -> Result<AgentReport> {
        let mut report = AgentReport {
            goal: goal.to_string(),
            plan: plan_steps(goal),
            context,
            summary: None,
            actions: None,
            trust: None,
        };

        let Some(text) = report.context.context() else {
            warn!("no document context retrieved; skipping generation");
            return Ok(report);
        };
        let input: String = text.chars().take(self.config.max_prompt_context_chars).collect();

        let summary = self
            .generator
            .generate(&prompt::summarize(&input))
            .await
            .map_err(StageError::at(Stage::Generation))?;
        let actions = self
            .generator
            .generate(&prompt::action_items(&input))
            .await
            .map_err(StageError::at(Stage::Generation))?;

        info!(summary_len = summary.len(), actions_len = actions.len(), "research run completed");
        report.summary = Some(summary);
        report.actions = Some(actions);
        Ok(report)
    }
}
