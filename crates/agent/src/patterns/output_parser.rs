//! Parser for the ReAct text format.
//!
//! ```text
//! Thought: I should check the service documents
//! Action: service_docs
//! Action Input: price of the premium plan
//! ```
//!
//! or
//!
//! ```text
//! Thought: I now know the final answer
//! Final Answer: The premium plan is $20 a month.
//! ```

use crate::context::AgentAction;
use crate::error::AgentError;
use regex::Regex;
use std::sync::LazyLock;

pub const FINAL_ANSWER: &str = "Final Answer:";

pub const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const ANSWER_AND_ACTION: &str =
    "Parsing LLM output produced both a final answer and a parse-able action";
pub const UNPARSEABLE: &str = "Could not parse LLM output";

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").unwrap()
});
static ACTION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").unwrap());
static ACTION_INPUT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").unwrap());

/// What the model decided to do this iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentDecision {
    Act(AgentAction),
    Finish { answer: String, log: String },
}

/// Parse one model completion.
pub fn parse_output(text: &str) -> Result<AgentDecision, AgentError> {
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION.captures(text) {
        if includes_answer {
            return Err(parsing(ANSWER_AND_ACTION, text));
        }
        let tool = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let input = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_matches('"')
            .to_string();
        return Ok(AgentDecision::Act(AgentAction {
            tool,
            input,
            log: text.to_string(),
        }));
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentDecision::Finish {
            answer,
            log: text.to_string(),
        });
    }

    if !ACTION_ONLY.is_match(text) {
        Err(parsing(MISSING_ACTION, text))
    } else if !ACTION_INPUT_ONLY.is_match(text) {
        Err(parsing(MISSING_ACTION_INPUT, text))
    } else {
        // Both markers present, but out of order.
        Err(parsing(UNPARSEABLE, text))
    }
}

fn parsing(reason: &str, output: &str) -> AgentError {
    AgentError::Parsing {
        reason: reason.to_string(),
        output: output.to_string(),
    }
}
