//! Error types for agent runs, answer routing and feedback.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The model's output was neither a valid action nor a final answer.
    #[error("Could not parse agent output: {reason}")]
    Parsing { reason: String, output: String },

    /// The iteration budget ran out before a final answer.
    #[error("Agent stopped after {iterations} iterations without a final answer")]
    NonConvergence { iterations: usize },

    #[error(transparent)]
    Core(#[from] supportdesk_core::Error),
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(
        "The input is {tokens} tokens, which exceeds the limit of {ceiling}. Please shorten it and try again."
    )]
    InputTooLarge { tokens: usize, ceiling: usize },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Core(#[from] supportdesk_core::Error),
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Cannot {event} while feedback is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("Failed to record feedback: {0}")]
    Sink(String),
}

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("Failed to read FAQ file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse FAQ file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid FAQ entry '{label}': {reason}")]
    Invalid { label: String, reason: String },

    #[error("No FAQ option {index} at level {level}")]
    OutOfRange { level: usize, index: usize },
}
