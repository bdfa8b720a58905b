//! Scratchpad: the agent's reasoning record for a single run.
//!
//! Holds the completed (action, observation) steps that are replayed to the
//! model on every iteration, plus a flat Thought/Action/Observation trace for
//! logging and inspection. Cleared when the run ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Data Structures ───────────────────────────────────────────────────────

/// A tool invocation chosen by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool: String,
    pub input: String,
    /// Raw model text that produced this action
    pub log: String,
}

/// An action together with what came back from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}

/// A single entry in the reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: TraceKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The kind of reasoning trace entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TraceKind {
    Thought,
    Action,
    Observation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scratchpad {
    pub steps: Vec<AgentStep>,
    pub trace: Vec<TraceEntry>,
    /// Current iteration counter.
    pub iterations: usize,
    pub max_iterations: usize,
}

// ── Implementation ────────────────────────────────────────────────────────

impl Scratchpad {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            steps: Vec::new(),
            trace: Vec::new(),
            iterations: 0,
            max_iterations,
        }
    }

    // ── Trace recording ──

    pub fn add_thought(&mut self, thought: &str) {
        self.push_trace(TraceKind::Thought, thought);
    }

    pub fn add_action(&mut self, action: &str) {
        self.push_trace(TraceKind::Action, action);
    }

    pub fn add_observation(&mut self, observation: &str) {
        self.push_trace(TraceKind::Observation, observation);
    }

    fn push_trace(&mut self, kind: TraceKind, content: &str) {
        self.trace.push(TraceEntry {
            kind,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Record a completed step.
    pub fn push_step(&mut self, action: AgentAction, observation: impl Into<String>) {
        let observation = observation.into();
        self.add_action(&format!("{}({})", action.tool, action.input));
        self.add_observation(&observation);
        self.steps.push(AgentStep {
            action,
            observation,
        });
    }

    // ── Iteration tracking ──

    /// Increment the iteration counter. Returns `false` if max exceeded.
    pub fn tick(&mut self) -> bool {
        self.iterations += 1;
        self.iterations <= self.max_iterations
    }

    // ── Rendering ──

    /// Render the steps in the form the model continues from:
    /// each step's log, its observation, then a fresh `Thought:` cue.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&step.action.log);
            out.push_str("\nObservation: ");
            out.push_str(&step.observation);
            out.push_str("\nThought: ");
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn action(tool: &str, input: &str) -> AgentAction {
        AgentAction {
            tool: tool.into(),
            input: input.into(),
            log: format!("I should look this up.\nAction: {tool}\nAction Input: {input}"),
        }
    }

    #[test]
    fn new_scratchpad_is_empty() {
        let pad = Scratchpad::new(5);
        assert!(pad.steps.is_empty());
        assert!(pad.trace.is_empty());
        assert_eq!(pad.render(), "");
    }

    #[test]
    fn tick_respects_limit() {
        let mut pad = Scratchpad::new(2);
        assert!(pad.tick());
        assert!(pad.tick());
        assert!(!pad.tick());
    }

    #[test]
    fn steps_render_with_observation_and_thought_cue() {
        let mut pad = Scratchpad::new(5);
        pad.push_step(action("service_docs", "price of plan A"), "Plan A is $10.");

        assert_eq!(
            pad.render(),
            "I should look this up.\nAction: service_docs\nAction Input: price of plan A\nObservation: Plan A is $10.\nThought: "
        );
        assert_eq!(pad.trace.len(), 2);
        assert_eq!(pad.trace[0].kind, TraceKind::Action);
        assert_eq!(pad.trace[1].kind, TraceKind::Observation);
    }
}
