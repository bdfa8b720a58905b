//! Tool trait: the named capabilities the support agent can choose from.
//!
//! A tool takes one string argument plus a read-only view of the chat
//! history, and returns its textual output together with the messages it
//! wants appended to that history. Tools never mutate history themselves;
//! the caller decides when (and whether) to apply the delta.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ToolError;
use crate::message::Message;

/// The result of a tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The text handed back to the agent as an observation.
    pub output: String,

    /// Messages to append to the shared chat history, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history_delta: Vec<Message>,
}

impl ToolOutput {
    /// Output with no history side effect.
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            history_delta: Vec::new(),
        }
    }

    /// Output that records a (question, answer) exchange in history.
    pub fn exchange(question: impl Into<String>, answer: impl Into<String>) -> Self {
        let answer = answer.into();
        Self {
            history_delta: vec![Message::user(question), Message::assistant(answer.clone())],
            output: answer,
        }
    }
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (shown to the model verbatim).
    fn name(&self) -> &str;

    /// A description of when to use this tool (sent to the model).
    fn description(&self) -> &str;

    /// Run the tool on a single string argument.
    async fn call(&self, input: &str, history: &[Message]) -> std::result::Result<ToolOutput, ToolError>;
}

/// An ordered registry of available tools.
///
/// Registration order is kept so the tool list rendered into the agent
/// prompt is stable between runs.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Execute a tool by name.
    pub async fn call(
        &self,
        name: &str,
        input: &str,
        history: &[Message],
    ) -> std::result::Result<ToolOutput, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(input, history).await
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// `name: description` lines for prompt rendering.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        async fn call(&self, input: &str, _history: &[Message]) -> std::result::Result<ToolOutput, ToolError> {
            Ok(ToolOutput::exchange(input, input))
        }
    }

    struct SecondTool;

    #[async_trait]
    impl Tool for SecondTool {
        fn name(&self) -> &str { "second" }
        fn description(&self) -> &str { "Second tool" }
        async fn call(&self, _input: &str, history: &[Message]) -> std::result::Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(format!("{} messages", history.len())))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SecondTool));
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(SecondTool));
        assert_eq!(registry.names(), vec!["second", "echo"]);
        assert_eq!(registry.describe(), "second: Second tool\necho: Echoes back the input");
    }

    #[tokio::test]
    async fn registry_call_returns_delta() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let out = registry.call("echo", "hello world", &[]).await.unwrap();
        assert_eq!(out.output, "hello world");
        assert_eq!(out.history_delta.len(), 2);
        assert_eq!(out.history_delta[0].role, crate::Role::User);
    }

    #[tokio::test]
    async fn registry_call_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry.call("nonexistent", "x", &[]).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn text_output_has_no_delta() {
        assert!(ToolOutput::text("x").history_delta.is_empty());
    }
}
