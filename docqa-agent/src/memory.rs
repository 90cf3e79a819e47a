//! Step memory for the planner loop.

use serde::{Deserialize, Serialize};

use crate::planner::AgentAction;

/// Observations longer than this are cut when memory is rendered into a prompt.
pub const OBSERVATION_PREVIEW_CHARS: usize = 200;

/// One completed planner step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStep {
    /// The action the planner chose.
    pub action: AgentAction,
    /// The input the planner supplied with it.
    pub input: String,
    /// What executing the action produced.
    pub observation: String,
}

/// Ordered record of the steps taken so far in one planner run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMemory {
    steps: Vec<MemoryStep>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        action: AgentAction,
        input: impl Into<String>,
        observation: impl Into<String>,
    ) {
        let step = MemoryStep { action, input: input.into(), observation: observation.into() };
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[MemoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render memory for the planner prompt, one line per step.
    ///
    /// An empty memory renders as `None`.
    pub fn format(&self) -> String {
        if self.steps.is_empty() {
            return "None".to_string();
        }
        self.steps
            .iter()
            .map(|step| {
                let preview: String =
                    step.observation.chars().take(OBSERVATION_PREVIEW_CHARS).collect();
                format!("Action: {} | Observation: {preview}", step.action)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
