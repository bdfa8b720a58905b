//! Corpus tool: answers from one document corpus through its retrieval chain.
//!
//! Each call runs the chain against the history the agent passes in and hands
//! back the question/answer pair as the tool's history delta, so follow-up
//! calls in the same run see it.

use async_trait::async_trait;
use std::sync::Arc;
use supportdesk_core::error::ToolError;
use supportdesk_core::message::Message;
use supportdesk_core::tool::{Tool, ToolOutput};
use supportdesk_retrieval::Responder;
use tracing::debug;

pub struct CorpusTool {
    name: String,
    description: String,
    responder: Arc<dyn Responder>,
}

impl CorpusTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            responder,
        }
    }
}

#[async_trait]
impl Tool for CorpusTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, input: &str, history: &[Message]) -> Result<ToolOutput, ToolError> {
        let question = input.trim();
        if question.is_empty() {
            return Err(ToolError::InvalidInput(format!(
                "{} needs a question to look up",
                self.name
            )));
        }

        let answer = self
            .responder
            .respond(question, history)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        debug!(tool = %self.name, history = history.len(), "Corpus tool answered");
        Ok(ToolOutput::exchange(question, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use supportdesk_core::Role;

    /// Echoes the question and records how much history it was given.
    struct EchoResponder {
        seen_history: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Responder for EchoResponder {
        async fn respond(
            &self,
            input: &str,
            history: &[Message],
        ) -> supportdesk_core::Result<String> {
            self.seen_history.lock().unwrap().push(history.len());
            Ok(format!("answer to {input}"))
        }
    }

    struct FailingResponder;

    #[async_trait]
    impl Responder for FailingResponder {
        async fn respond(&self, _: &str, _: &[Message]) -> supportdesk_core::Result<String> {
            Err(supportdesk_core::Error::Internal("store offline".into()))
        }
    }

    #[tokio::test]
    async fn call_returns_exchange_delta() {
        let responder = Arc::new(EchoResponder {
            seen_history: Mutex::new(Vec::new()),
        });
        let tool = CorpusTool::new("service_docs", "Service plans", responder.clone());
        let history = vec![Message::user("hi"), Message::assistant("hello")];

        let out = tool.call("  What plans exist? ", &history).await.unwrap();
        assert_eq!(out.output, "answer to What plans exist?");
        assert_eq!(out.history_delta.len(), 2);
        assert_eq!(out.history_delta[0].role, Role::User);
        assert_eq!(out.history_delta[0].content, "What plans exist?");
        assert_eq!(out.history_delta[1].role, Role::Assistant);
        assert_eq!(responder.seen_history.lock().unwrap().as_slice(), [2]);
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let tool = CorpusTool::new("company_info", "Company", Arc::new(FailingResponder));
        let err = tool.call("   ", &[]).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn responder_failure_names_the_tool() {
        let tool = CorpusTool::new("company_info", "Company", Arc::new(FailingResponder));
        let err = tool.call("Who founded you?", &[]).await.unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool_name, reason } => {
                assert_eq!(tool_name, "company_info");
                assert!(reason.contains("store offline"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
