//! Answer routing: sends a user turn to the retrieval chain or the agent and
//! records the outcome in the history ledger.
//!
//! The ledger is only touched after the answer succeeds, so a failed turn
//! leaves history exactly as it was.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use supportdesk_retrieval::Responder;
use tracing::{debug, info};

use crate::context::HistoryLedger;
use crate::error::RouterError;
use crate::patterns::ReactAgent;

/// How a session answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    AgentEnabled,
    #[default]
    AgentDisabled,
}

impl Mode {
    pub fn from_agent_flag(agent: bool) -> Self {
        if agent {
            Self::AgentEnabled
        } else {
            Self::AgentDisabled
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AgentEnabled => write!(f, "agent"),
            Self::AgentDisabled => write!(f, "rag"),
        }
    }
}

pub struct AnswerRouter {
    /// Chain over the combined corpus
    chain: Arc<dyn Responder>,
    agent: Arc<ReactAgent>,
}

impl AnswerRouter {
    pub fn new(chain: Arc<dyn Responder>, agent: Arc<ReactAgent>) -> Self {
        Self { chain, agent }
    }

    pub fn agent(&self) -> &ReactAgent {
        &self.agent
    }

    /// Answer `input` in `mode`, updating `ledger` on success.
    pub async fn answer(
        &self,
        input: &str,
        mode: Mode,
        ledger: &mut HistoryLedger,
    ) -> Result<String, RouterError> {
        let tokens = ledger.count_tokens(input);
        if tokens > ledger.ceiling() {
            return Err(RouterError::InputTooLarge {
                tokens,
                ceiling: ledger.ceiling(),
            });
        }

        let history = ledger.messages();
        let answer = match mode {
            Mode::AgentDisabled => {
                let answer = self.chain.respond(input, &history).await?;
                ledger.append(input, &answer);
                answer
            }
            Mode::AgentEnabled => {
                let outcome = self.agent.run(input, &history).await?;
                debug!(
                    delta = outcome.history_delta.len(),
                    tool_calls = outcome.tool_calls,
                    "Applying agent history delta"
                );
                ledger.apply(outcome.history_delta);
                outcome.answer
            }
        };

        let evicted = ledger.trim();
        info!(
            %mode,
            input_tokens = tokens,
            history_tokens = ledger.token_total(),
            evicted,
            "Answered"
        );
        Ok(answer)
    }
}
