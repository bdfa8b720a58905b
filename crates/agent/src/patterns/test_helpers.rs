//! Shared test helpers for agent tests.

use async_trait::async_trait;
use std::sync::Mutex;
use supportdesk_core::error::{ProviderError, ToolError};
use supportdesk_core::message::Message;
use supportdesk_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use supportdesk_core::token::Tokenizer;
use supportdesk_core::tool::{Tool, ToolOutput};
use supportdesk_retrieval::Responder;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script plain text completions, in order.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| make_text_response(t)).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let count = requests.len();

        if count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                responses.len()
            );
        }

        requests.push(request);
        Ok(responses[count].clone())
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Answers every question with a fixed prefix and records the history
/// length it was given.
pub struct RecordingResponder {
    prefix: String,
    pub seen: Mutex<Vec<(String, usize)>>,
}

impl RecordingResponder {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<(String, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn respond(&self, input: &str, history: &[Message]) -> supportdesk_core::Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((input.to_string(), history.len()));
        Ok(format!("{}{}", self.prefix, input))
    }
}

/// A tool that returns a fixed observation and no history delta.
pub struct StaticTool {
    pub name: &'static str,
    pub output: &'static str,
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed observation"
    }

    async fn call(&self, _input: &str, _history: &[Message]) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(self.output))
    }
}

/// Counts whitespace-separated words, so history budgets read as word counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
