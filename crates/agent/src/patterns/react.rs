//! ReAct pattern: Thought → Action → Observation loop.
//!
//! The agent is zero-shot: it sees the tool names and descriptions, the
//! question, and its own scratchpad, but not the conversation history.
//! History flows to the tools instead. Each tool call receives the base
//! history plus every delta produced earlier in the same run, and the run
//! returns all deltas in call order for the caller to record.
//!
//! # Termination
//!
//! - A `Final Answer:` ends the run.
//! - Unparseable output is fed back as an observation when
//!   `handle_parsing_errors` is set, and fails the run otherwise.
//! - After `max_iterations` the early-stopping policy produces the answer:
//!   `Generate` makes one last model call from the scratchpad, `Force`
//!   returns a fixed message.

use std::sync::Arc;
use supportdesk_config::{AgentConfig, EarlyStopping};
use supportdesk_core::error::ToolError;
use supportdesk_core::message::Message;
use supportdesk_core::provider::{Provider, ProviderRequest};
use supportdesk_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::context::{AgentAction, Scratchpad, TraceEntry};
use crate::error::AgentError;
use crate::patterns::output_parser::{AgentDecision, parse_output};

const PREFIX: &str =
    "Answer the following questions as best you can. You have access to the following tools:";

const SUFFIX: &str = "Begin!";

const STOP_SEQUENCE: &str = "\nObservation:";

const FINAL_ANSWER_CUE: &str = "\n\nI now need to return a final answer based on the previous steps:";

pub const FORCED_STOP_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// A zero-shot ReAct agent over a tool registry.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    early_stopping: EarlyStopping,
    handle_parsing_errors: bool,
}

/// The result of a ReAct execution.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// The final answer text.
    pub answer: String,
    /// Messages the tools produced for the conversation history, in call order.
    pub history_delta: Vec<Message>,
    /// Number of iterations used.
    pub iterations: usize,
    /// Tool calls made (unknown tools and parse errors excluded).
    pub tool_calls: usize,
    /// Whether the early-stopping policy produced the answer.
    pub stopped_early: bool,
    /// Complete reasoning trace.
    pub trace: Vec<TraceEntry>,
}

/// Mutable state of one run.
struct Run {
    pad: Scratchpad,
    history: Vec<Message>,
    delta: Vec<Message>,
    tool_calls: usize,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            tools,
            max_iterations: 5,
            early_stopping: EarlyStopping::Generate,
            handle_parsing_errors: true,
        }
    }

    /// Apply the `[agent]` config section.
    pub fn with_config(self, config: &AgentConfig) -> Self {
        self.with_max_iterations(config.max_iterations)
            .with_early_stopping(config.early_stopping)
            .with_parsing_errors(config.handle_parsing_errors)
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max as usize;
        self
    }

    pub fn with_early_stopping(mut self, policy: EarlyStopping) -> Self {
        self.early_stopping = policy;
        self
    }

    pub fn with_parsing_errors(mut self, handle: bool) -> Self {
        self.handle_parsing_errors = handle;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Execute the ReAct loop for `input` against a read-only view of history.
    pub async fn run(&self, input: &str, history: &[Message]) -> Result<AgentOutcome, AgentError> {
        let mut run = Run {
            pad: Scratchpad::new(self.max_iterations),
            history: history.to_vec(),
            delta: Vec::new(),
            tool_calls: 0,
        };

        info!(model = %self.model, max_iter = self.max_iterations, tools = self.tools.len(), "ReAct loop starting");

        let (answer, stopped_early) = match self.iterate(input, &mut run).await {
            Ok(answer) => (answer, false),
            Err(AgentError::NonConvergence { iterations }) => {
                warn!(iterations, policy = ?self.early_stopping, "ReAct: max iterations reached");
                (self.stop_early(input, &run.pad).await?, true)
            }
            Err(e) => return Err(e),
        };

        let iterations = run.pad.iterations.min(self.max_iterations);
        info!(iterations, tool_calls = run.tool_calls, stopped_early, "ReAct loop completed");

        Ok(AgentOutcome {
            answer,
            history_delta: run.delta,
            iterations,
            tool_calls: run.tool_calls,
            stopped_early,
            trace: run.pad.trace,
        })
    }

    async fn iterate(&self, input: &str, run: &mut Run) -> Result<String, AgentError> {
        while run.pad.tick() {
            debug!(iteration = run.pad.iterations, "ReAct iteration");

            let request = self.request(self.prompt(input, &run.pad.render()))
                .with_stop(vec![STOP_SEQUENCE.to_string()]);
            let output = self
                .provider
                .complete(request)
                .await
                .map_err(supportdesk_core::Error::from)?
                .message
                .content;

            match parse_output(&output) {
                Ok(AgentDecision::Finish { answer, log }) => {
                    run.pad.add_thought(&log);
                    return Ok(answer);
                }
                Ok(AgentDecision::Act(action)) => {
                    run.pad.add_thought(&action.log);
                    let observation = self.invoke(&action, run).await?;
                    run.pad.push_step(action, observation);
                }
                Err(AgentError::Parsing { reason, output }) if self.handle_parsing_errors => {
                    warn!(%reason, "ReAct: unparseable output fed back as observation");
                    let action = AgentAction {
                        tool: "_Exception".into(),
                        input: reason.clone(),
                        log: output,
                    };
                    run.pad.push_step(action, reason);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AgentError::NonConvergence {
            iterations: self.max_iterations,
        })
    }

    /// Run one tool call and return its observation.
    async fn invoke(&self, action: &AgentAction, run: &mut Run) -> Result<String, AgentError> {
        let Some(tool) = self.tools.get(&action.tool) else {
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                self.tools.names().join(", ")
            ));
        };

        run.tool_calls += 1;
        match tool.call(&action.input, &run.history).await {
            Ok(out) => {
                debug!(tool = %action.tool, delta = out.history_delta.len(), "Tool returned");
                run.history.extend(out.history_delta.iter().cloned());
                run.delta.extend(out.history_delta);
                Ok(out.output)
            }
            Err(ToolError::InvalidInput(reason)) => Ok(format!("Invalid input: {reason}")),
            Err(e) => Err(supportdesk_core::Error::from(e).into()),
        }
    }

    async fn stop_early(&self, input: &str, pad: &Scratchpad) -> Result<String, AgentError> {
        match self.early_stopping {
            EarlyStopping::Force => Ok(FORCED_STOP_ANSWER.to_string()),
            EarlyStopping::Generate => {
                let scratchpad = format!("{}{FINAL_ANSWER_CUE}", pad.render());
                let output = self
                    .provider
                    .complete(self.request(self.prompt(input, &scratchpad)))
                    .await
                    .map_err(supportdesk_core::Error::from)?
                    .message
                    .content;

                match parse_output(&output) {
                    Ok(AgentDecision::Finish { answer, .. }) => Ok(answer),
                    _ => Ok(output.trim().to_string()),
                }
            }
        }
    }

    fn request(&self, prompt: String) -> ProviderRequest {
        ProviderRequest::new(&self.model, vec![Message::user(prompt)])
            .with_temperature(self.temperature)
    }

    fn prompt(&self, input: &str, scratchpad: &str) -> String {
        let names = self.tools.names().join(", ");
        format!(
            "{PREFIX}\n\n{tools}\n\n\
             Use the following format:\n\n\
             Question: the input question you must answer\n\
             Thought: you should always think about what to do\n\
             Action: the action to take, should be one of [{names}]\n\
             Action Input: the input to the action\n\
             Observation: the result of the action\n\
             ... (this Thought/Action/Action Input/Observation can repeat N times)\n\
             Thought: I now know the final answer\n\
             Final Answer: the final answer to the original input question\n\n\
             {SUFFIX}\n\n\
             Question: {input}\n\
             Thought:{scratchpad}",
            tools = self.tools.describe(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_helpers::*;
    use supportdesk_core::Role;
    use supportdesk_tools::CorpusTool;

    fn registry(service: Arc<RecordingResponder>, company: Arc<RecordingResponder>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StaticTool {
            name: "web_search",
            output: "EcoTee was founded in 2015.",
        }));
        registry.register(Box::new(CorpusTool::new("service_docs", "Service plans", service)));
        registry.register(Box::new(CorpusTool::new("company_info", "The company", company)));
        Arc::new(registry)
    }

    fn responders() -> (Arc<RecordingResponder>, Arc<RecordingResponder>) {
        (
            Arc::new(RecordingResponder::new("service says: ")),
            Arc::new(RecordingResponder::new("company says: ")),
        )
    }

    #[tokio::test]
    async fn immediate_final_answer() {
        let (s, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            " I can answer directly.\nFinal Answer: Hello!",
        ]));
        let agent = ReactAgent::new(provider.clone(), "gpt-4o-mini", 0.5, registry(s, c));

        let outcome = agent.run("hi", &[]).await.unwrap();
        assert_eq!(outcome.answer, "Hello!");
        assert!(outcome.history_delta.is_empty());
        assert_eq!(outcome.iterations, 1);
        assert!(!outcome.stopped_early);

        let request = &provider.requests()[0];
        assert_eq!(request.stop, vec![STOP_SEQUENCE.to_string()]);
        let prompt = &request.messages[0].content;
        assert!(prompt.contains("service_docs: Service plans"));
        assert!(prompt.contains("[web_search, service_docs, company_info]"));
        assert!(prompt.ends_with("Question: hi\nThought:"));
    }

    #[tokio::test]
    async fn two_corpus_calls_produce_two_pairs() {
        let (service, company) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            " Check plans.\nAction: service_docs\nAction Input: plan prices",
            " Check company.\nAction: company_info\nAction Input: founding year",
            " I now know the final answer\nFinal Answer: Plans from $10; founded 2015.",
        ]));
        let agent = ReactAgent::new(
            provider.clone(),
            "gpt-4o-mini",
            0.5,
            registry(service.clone(), company.clone()),
        );
        let history = vec![Message::user("earlier"), Message::assistant("reply")];

        let outcome = agent.run("Prices and founding?", &history).await.unwrap();
        assert_eq!(outcome.answer, "Plans from $10; founded 2015.");
        assert_eq!(outcome.tool_calls, 2);
        assert_eq!(outcome.history_delta.len(), 4);
        assert_eq!(outcome.history_delta[0].role, Role::User);
        assert_eq!(outcome.history_delta[0].content, "plan prices");
        assert_eq!(outcome.history_delta[3].content, "company says: founding year");

        // The second tool sees the first tool's exchange.
        assert_eq!(service.seen(), vec![("plan prices".to_string(), 2)]);
        assert_eq!(company.seen(), vec![("founding year".to_string(), 4)]);

        // The scratchpad carries the first observation into the second prompt.
        let second_prompt = &provider.requests()[1].messages[0].content;
        assert!(second_prompt.contains("Observation: service says: plan prices\nThought: "));
    }

    #[tokio::test]
    async fn web_search_adds_no_history() {
        let (s, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Action: web_search\nAction Input: EcoTee founding",
            "Final Answer: 2015",
        ]));
        let agent = ReactAgent::new(provider, "gpt-4o-mini", 0.5, registry(s, c));

        let outcome = agent.run("When was EcoTee founded?", &[]).await.unwrap();
        assert_eq!(outcome.answer, "2015");
        assert_eq!(outcome.tool_calls, 1);
        assert!(outcome.history_delta.is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_back() {
        let (s, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Action: billing_docs\nAction Input: invoice",
            "Final Answer: Sorry, I could not find that.",
        ]));
        let agent = ReactAgent::new(provider.clone(), "gpt-4o-mini", 0.5, registry(s, c));

        let outcome = agent.run("Where is my invoice?", &[]).await.unwrap();
        assert_eq!(outcome.tool_calls, 0);
        let second_prompt = &provider.requests()[1].messages[0].content;
        assert!(second_prompt.contains("billing_docs is not a valid tool"));
    }

    #[tokio::test]
    async fn parse_errors_are_fed_back() {
        let (s, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "I think the answer is ten dollars.",
            "Final Answer: Ten dollars.",
        ]));
        let agent = ReactAgent::new(provider.clone(), "gpt-4o-mini", 0.5, registry(s, c));

        let outcome = agent.run("Price?", &[]).await.unwrap();
        assert_eq!(outcome.answer, "Ten dollars.");
        let second_prompt = &provider.requests()[1].messages[0].content;
        assert!(second_prompt.contains("Observation: Invalid Format: Missing 'Action:'"));
    }

    #[tokio::test]
    async fn parse_errors_propagate_when_not_handled() {
        let (s, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&["gibberish"]));
        let agent = ReactAgent::new(provider, "gpt-4o-mini", 0.5, registry(s, c))
            .with_parsing_errors(false);

        let err = agent.run("Price?", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::Parsing { .. }));
    }

    #[tokio::test]
    async fn force_stop_after_max_iterations() {
        let (s, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Action: web_search\nAction Input: a",
            "Action: web_search\nAction Input: b",
        ]));
        let agent = ReactAgent::new(provider.clone(), "gpt-4o-mini", 0.5, registry(s, c))
            .with_max_iterations(2)
            .with_early_stopping(EarlyStopping::Force);

        let outcome = agent.run("loop", &[]).await.unwrap();
        assert_eq!(outcome.answer, FORCED_STOP_ANSWER);
        assert!(outcome.stopped_early);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn generate_makes_one_final_call() {
        let (service, c) = responders();
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Action: service_docs\nAction Input: a",
            "Final Answer: Based on the documents, plans start at $10.",
        ]));
        let agent = ReactAgent::new(provider.clone(), "gpt-4o-mini", 0.5, registry(service, c))
            .with_max_iterations(1)
            .with_early_stopping(EarlyStopping::Generate);

        let outcome = agent.run("Price?", &[]).await.unwrap();
        assert_eq!(outcome.answer, "Based on the documents, plans start at $10.");
        assert!(outcome.stopped_early);
        // Tool deltas from before the stop are still returned.
        assert_eq!(outcome.history_delta.len(), 2);

        let final_request = &provider.requests()[1];
        assert!(final_request.stop.is_empty());
        assert!(final_request.messages[0].content.ends_with(FINAL_ANSWER_CUE));
    }

    #[tokio::test]
    async fn generate_returns_raw_text_after_repeated_parse_errors() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "bad1",
            "bad2",
            "bad3",
            "bad4",
            "bad5",
            "  just some prose\n",
        ]));
        let agent = ReactAgent::new(provider.clone(), "gpt-4o-mini", 0.5, Arc::new(ToolRegistry::new()))
            .with_early_stopping(EarlyStopping::Generate);

        let outcome = agent.run("Price?", &[]).await.unwrap();
        assert_eq!(outcome.answer, "just some prose");
        assert!(outcome.stopped_early);
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(provider.call_count(), 6);

        let final_prompt = &provider.requests()[5].messages[0].content;
        assert!(final_prompt.contains("Observation: Invalid Format: Missing 'Action:'"));
        assert!(final_prompt.ends_with(FINAL_ANSWER_CUE));
    }

    #[tokio::test]
    async fn tool_failure_fails_the_run() {
        struct Broken;

        #[async_trait::async_trait]
        impl supportdesk_core::Tool for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn description(&self) -> &str {
                "always fails"
            }
            async fn call(
                &self,
                _: &str,
                _: &[Message],
            ) -> Result<supportdesk_core::ToolOutput, ToolError> {
                Err(ToolError::ExecutionFailed {
                    tool_name: "broken".into(),
                    reason: "offline".into(),
                })
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(Broken));
        let provider = Arc::new(SequentialMockProvider::texts(&["Action: broken\nAction Input: x"]));
        let agent = ReactAgent::new(provider, "gpt-4o-mini", 0.5, Arc::new(registry));

        let err = agent.run("x", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::Core(supportdesk_core::Error::Tool(_))));
    }
}
