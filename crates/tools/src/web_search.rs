//! Web search tool backed by SerpAPI.
//!
//! The response is reduced to a single text observation, taking the first of:
//! the answer box, the knowledge-graph description, or the organic result
//! snippets. Web search answers are not added to the conversation history.

use async_trait::async_trait;
use serde_json::Value;
use supportdesk_config::WebSearchConfig;
use supportdesk_core::error::ToolError;
use supportdesk_core::message::Message;
use supportdesk_core::tool::{Tool, ToolOutput};
use tracing::{debug, warn};

const NO_RESULT: &str = "No good search result found";
const MAX_SNIPPETS: usize = 3;

pub struct WebSearchTool {
    name: String,
    description: String,
    api_url: String,
    engine: String,
    api_key: String,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(config: &WebSearchConfig, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        Self {
            name: config.tool_name.clone(),
            description: config.description.clone(),
            api_url: config.api_url.clone(),
            engine: config.engine.clone(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build from config, or `None` when search is disabled or has no key.
    pub fn from_config(config: &WebSearchConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        match &config.api_key {
            Some(key) if !key.is_empty() => Some(Self::new(config, key.clone())),
            _ => {
                warn!("Web search is enabled but no SerpAPI key is set; the tool is not registered");
                None
            }
        }
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, input: &str, _history: &[Message]) -> Result<ToolOutput, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("Search query is empty".into()));
        }

        debug!(tool = %self.name, query, "Searching the web");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query),
                ("engine", self.engine.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| self.failed(format!("invalid response ({status}): {e}")))?;

        let text = summarize(&body).map_err(|e| self.failed(e))?;
        Ok(ToolOutput::text(text))
    }
}

/// Reduce a SerpAPI response body to the most direct answer it holds.
pub fn summarize(body: &Value) -> Result<String, String> {
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        return Err(format!("SerpAPI error: {error}"));
    }

    if let Some(answer_box) = body.get("answer_box") {
        for key in ["answer", "snippet"] {
            if let Some(text) = answer_box.get(key).and_then(Value::as_str) {
                return Ok(text.to_string());
            }
        }
        if let Some(text) = answer_box
            .get("snippet_highlighted_words")
            .and_then(|w| w.get(0))
            .and_then(Value::as_str)
        {
            return Ok(text.to_string());
        }
    }

    if let Some(text) = body
        .get("knowledge_graph")
        .and_then(|kg| kg.get("description"))
        .and_then(Value::as_str)
    {
        return Ok(text.to_string());
    }

    let snippets: Vec<&str> = body
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r.get("snippet").and_then(Value::as_str))
                .take(MAX_SNIPPETS)
                .collect()
        })
        .unwrap_or_default();

    if snippets.is_empty() {
        Ok(NO_RESULT.to_string())
    } else {
        Ok(snippets.join("\n"))
    }
}
