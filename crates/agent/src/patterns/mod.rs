//! Agent patterns: structured reasoning strategies.
//!
//! The support agent uses a zero-shot **ReAct** loop: the model writes a
//! Thought, picks an Action from the tool list, reads the Observation, and
//! repeats until it can give a Final Answer.

pub mod output_parser;
pub mod react;

pub use output_parser::{AgentDecision, parse_output};
pub use react::{AgentOutcome, ReactAgent};

#[cfg(test)]
pub(crate) mod test_helpers;
