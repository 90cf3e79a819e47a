//! JSON-action planner loop.
//!
//! Each step asks the model for one action as JSON:
//!
//! ```json
//! { "action": "RETRIEVE_CONTEXT", "input": "payment terms" }
//! ```
//!
//! The action is executed and recorded in [`AgentMemory`], and the memory is
//! fed back into the next planning prompt. A reply that is not valid JSON
//! gets exactly one stricter re-prompt; if that fails too the run stops with
//! [`PlannerOutcome::Unparsed`] carrying the raw text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use docqa_rag::{DocumentSession, RetrievedContext, TrustScore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::AgentConfig;
use crate::error::{Result, Stage, StageError};
use crate::generation::TextGenerator;
use crate::memory::AgentMemory;
use crate::prompt;

const NO_CONTEXT_FOUND: &str = "No relevant context found.";
const ANSWER_NEEDS_CONTEXT: &str = "No context retrieved yet. Use RETRIEVE_CONTEXT first.";

/// An action the planner may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentAction {
    /// Search the document with the action input as query.
    RetrieveContext,
    /// Answer from the most recently retrieved context.
    Answer,
    /// Stop the run.
    Finish,
}

impl AgentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetrieveContext => "RETRIEVE_CONTEXT",
            Self::Answer => "ANSWER",
            Self::Finish => "FINISH",
        }
    }
}

impl fmt::Display for AgentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RETRIEVE_CONTEXT" => Ok(Self::RetrieveContext),
            "ANSWER" => Ok(Self::Answer),
            "FINISH" => Ok(Self::Finish),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// A parsed planner decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerReply {
    pub action: AgentAction,
    pub input: String,
}

#[derive(Deserialize)]
struct RawReply {
    action: String,
    #[serde(default)]
    input: Option<String>,
}

/// Parse a planner reply.
///
/// Accepts a bare JSON object, one wrapped in a fenced code block, or one
/// embedded in surrounding prose. Returns `None` when no candidate parses or
/// the action is not one of the known actions.
pub fn parse_action(raw: &str) -> Option<PlannerReply> {
    [Some(raw.trim()), fenced_block(raw), brace_span(raw)]
        .into_iter()
        .flatten()
        .find_map(|candidate| {
            let reply: RawReply = serde_json::from_str(candidate.trim()).ok()?;
            let action = reply.action.parse().ok()?;
            Some(PlannerReply { action, input: reply.input.unwrap_or_default() })
        })
}

fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")? + 3;
    let rest = &raw[open..];
    // Skip a language tag such as `json`.
    let body = rest.find('\n').map_or(rest, |newline| &rest[newline + 1..]);
    let close = body.find("```")?;
    Some(&body[..close])
}

fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn input_or<'a>(input: &'a str, goal: &'a str) -> &'a str {
    if input.trim().is_empty() { goal } else { input }
}

/// An answer produced by an `ANSWER` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerAnswer {
    pub text: String,
    pub trust: TrustScore,
}

/// How a planner run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlannerOutcome {
    /// The planner chose `FINISH`.
    Finished { answer: Option<PlannerAnswer> },
    /// `max_steps` iterations ran without a `FINISH`.
    StepLimitReached { answer: Option<PlannerAnswer> },
    /// The planner's reply could not be parsed, even after a re-prompt.
    Unparsed { raw: String },
}

impl PlannerOutcome {
    /// The latest answer, if the run produced one.
    pub fn answer(&self) -> Option<&PlannerAnswer> {
        match self {
            Self::Finished { answer } | Self::StepLimitReached { answer } => answer.as_ref(),
            Self::Unparsed { .. } => None,
        }
    }
}

/// The result of [`PlannerAgent::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRun {
    pub goal: String,
    pub memory: AgentMemory,
    pub outcome: PlannerOutcome,
}

/// Lets the model drive retrieval and answering one action at a time.
#[derive(Clone)]
pub struct PlannerAgent {
    generator: Arc<dyn TextGenerator>,
    config: AgentConfig,
}

impl fmt::Debug for PlannerAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerAgent")
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

impl PlannerAgent {
    pub fn new(generator: Arc<dyn TextGenerator>, config: AgentConfig) -> Self {
        Self { generator, config }
    }

    /// Run the loop for at most `max_steps` planning steps.
    ///
    /// # Errors
    ///
    /// - [`Stage::Generation`] if a planner or answer call fails.
    /// - [`Stage::Retrieval`] if a `RETRIEVE_CONTEXT` step fails.
    #[instrument(skip_all, fields(session.id = %session.id()))]
    pub async fn run(&self, session: &DocumentSession, goal: &str) -> Result<PlannerRun> {
        let options = self.config.context_options();
        let mut memory = AgentMemory::new();
        let mut latest_context: Option<RetrievedContext> = None;
        let mut answer: Option<PlannerAnswer> = None;

        for step in 0..self.config.max_steps {
            let reply = match self.next_action(goal, &memory).await? {
                Ok(reply) => reply,
                Err(raw) => {
                    warn!(step, "planner reply unparseable after re-prompt");
                    return Ok(PlannerRun {
                        goal: goal.to_string(),
                        memory,
                        outcome: PlannerOutcome::Unparsed { raw },
                    });
                }
            };
            info!(step, action = %reply.action, "planner chose action");

            match reply.action {
                AgentAction::RetrieveContext => {
                    let query = input_or(&reply.input, goal);
                    let handle = session.handle().map_err(StageError::at(Stage::Retrieval))?;
                    let context = handle
                        .retrieve_context(query, self.config.retrieve_k, &options)
                        .await
                        .map_err(StageError::at(Stage::Retrieval))?;
                    let observation = context.context().unwrap_or(NO_CONTEXT_FOUND).to_string();
                    memory.record(reply.action, reply.input, observation);
                    latest_context = Some(context);
                }
                AgentAction::Answer => {
                    let Some(RetrievedContext::Found { context, distances }) = &latest_context
                    else {
                        memory.record(reply.action, reply.input, ANSWER_NEEDS_CONTEXT);
                        continue;
                    };
                    let question = input_or(&reply.input, goal);
                    let text = self
                        .generator
                        .generate(&prompt::grounded_answer(context, question))
                        .await
                        .map_err(StageError::at(Stage::Generation))?;
                    let trust = session.score_trust(&text, context, distances);
                    memory.record(reply.action, reply.input, text.clone());
                    answer = Some(PlannerAnswer { text, trust });
                }
                AgentAction::Finish => {
                    memory.record(reply.action, reply.input, "Finished.");
                    return Ok(PlannerRun {
                        goal: goal.to_string(),
                        memory,
                        outcome: PlannerOutcome::Finished { answer },
                    });
                }
            }
        }

        info!(max_steps = self.config.max_steps, "planner step limit reached");
        Ok(PlannerRun {
            goal: goal.to_string(),
            memory,
            outcome: PlannerOutcome::StepLimitReached { answer },
        })
    }

    /// Ask for the next action, re-prompting once on an unparseable reply.
    ///
    /// The inner `Err` carries the second raw reply.
    async fn next_action(
        &self,
        goal: &str,
        memory: &AgentMemory,
    ) -> Result<std::result::Result<PlannerReply, String>> {
        let history = memory.format();
        let raw = self
            .generator
            .generate(&prompt::planner(goal, &history))
            .await
            .map_err(StageError::at(Stage::Generation))?;
        if let Some(reply) = parse_action(&raw) {
            return Ok(Ok(reply));
        }

        debug!(raw_len = raw.len(), "re-prompting planner for strict JSON");
        let retry = self
            .generator
            .generate(&prompt::planner_retry(goal, &history, &raw))
            .await
            .map_err(StageError::at(Stage::Generation))?;
        Ok(parse_action(&retry).ok_or(retry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let reply = parse_action(r#"{"action": "RETRIEVE_CONTEXT", "input": "fees"}"#).unwrap();
        assert_eq!(
            reply,
            PlannerReply { action: AgentAction::RetrieveContext, input: "fees".into() }
        );
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"action\": \"ANSWER\", \"input\": \"What are the fees?\"}\n```";
        let reply = parse_action(raw).unwrap();
        assert_eq!(reply.action, AgentAction::Answer);
        assert_eq!(reply.input, "What are the fees?");
    }

    #[test]
    fn parses_json_inside_prose() {
        let raw = "Sure! Here is my decision: {\"action\": \"finish\"} Hope that helps.";
        let reply = parse_action(raw).unwrap();
        assert_eq!(reply.action, AgentAction::Finish);
        assert_eq!(reply.input, "");
    }

    #[test]
    fn rejects_unknown_actions_and_prose() {
        assert!(parse_action(r#"{"action": "SEARCH_WEB", "input": "x"}"#).is_none());
        assert!(parse_action("I would retrieve context first.").is_none());
        assert!(parse_action(r#"{"input": "missing action"}"#).is_none());
    }

    #[test]
    fn action_names_round_trip() {
        for action in [AgentAction::RetrieveContext, AgentAction::Answer, AgentAction::Finish] {
            assert_eq!(action.as_str().parse::<AgentAction>().unwrap(), action);
            assert_eq!(serde_json::to_string(&action).unwrap(), format!("\"{action}\""));
        }
    }
}
