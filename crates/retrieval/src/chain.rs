//! History-aware retrieval chain.
//!
//! Answers a question against one corpus in three steps:
//!
//! 1. **Condense**: with prior history, ask the model to rewrite the latest
//!    input as a standalone query (skipped when the history holds no
//!    conversation turns, e.g. only a system preamble)
//! 2. **Retrieve**: fetch the top-k chunks for that query
//! 3. **Answer**: call the model with the support persona, the chunks
//!    stuffed into the system prompt, the history, and the raw input
//!
//! The chain never mutates history; callers decide what to record.

use crate::index::{RetrievedChunk, Retriever};
use async_trait::async_trait;
use std::sync::Arc;
use supportdesk_core::message::{Message, Role};
use supportdesk_core::{Provider, ProviderRequest};
use tracing::debug;

const CONDENSE_PROMPT: &str = "Given the conversation history and the latest user input, \
write a standalone version of the input that can be understood without the history. \
Return only the rewritten input.";

const ANSWER_PERSONA: &str = "You are a customer-support assistant who answers customer \
questions in a clear and polite tone. Use the context below to answer the question. \
If the question has several parts, answer each part in detail. \
If you do not know the answer, do not make one up; say politely that you do not know.";

/// Something that answers a question given the conversation so far.
///
/// Implemented by [`RetrievalChain`]; corpus tools and the router depend on
/// this trait so they can be driven by scripted responders in tests.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, input: &str, history: &[Message]) -> supportdesk_core::Result<String>;
}

/// Result of one chain invocation.
#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub answer: String,
    /// Query actually sent to the retriever
    pub query: String,
    pub sources: Vec<RetrievedChunk>,
}

/// A retriever plus a chat model, answering with the support persona.
pub struct RetrievalChain {
    retriever: Arc<dyn Retriever>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl RetrievalChain {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            retriever,
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Run the chain for `input` against `history`.
    pub async fn invoke(
        &self,
        input: &str,
        history: &[Message],
    ) -> supportdesk_core::Result<ChainOutput> {
        let query = self.condense(input, history).await?;
        let sources = self.retriever.retrieve(&query).await?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(Self::system_prompt(&sources)));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(input));

        let response = self
            .provider
            .complete(ProviderRequest::new(&self.model, messages).with_temperature(self.temperature))
            .await?;

        debug!(
            query = %query,
            sources = sources.len(),
            answer_len = response.message.content.len(),
            "Retrieval chain answered"
        );

        Ok(ChainOutput {
            answer: response.message.content,
            query,
            sources,
        })
    }

    async fn condense(&self, input: &str, history: &[Message]) -> supportdesk_core::Result<String> {
        if history.iter().all(|m| m.role == Role::System) {
            return Ok(input.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(CONDENSE_PROMPT));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(input));

        let response = self
            .provider
            .complete(ProviderRequest::new(&self.model, messages).with_temperature(self.temperature))
            .await?;

        let rewritten = response.message.content.trim();
        if rewritten.is_empty() {
            Ok(input.to_string())
        } else {
            Ok(rewritten.to_string())
        }
    }

    fn system_prompt(sources: &[RetrievedChunk]) -> String {
        let context = sources
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{ANSWER_PERSONA}\n\n{context}")
    }
}

#[async_trait]
impl Responder for RetrievalChain {
    async fn respond(&self, input: &str, history: &[Message]) -> supportdesk_core::Result<String> {
        Ok(self.invoke(input, history).await?.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::KeywordProvider;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Returns fixed chunks and remembers the queries it saw.
    struct FixedRetriever {
        chunks: Vec<&'static str>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, query: &str) -> supportdesk_core::Result<Vec<RetrievedChunk>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self
                .chunks
                .iter()
                .map(|c| RetrievedChunk {
                    source: PathBuf::from("faq.txt"),
                    content: c.to_string(),
                    score: 1.0,
                })
                .collect())
        }
    }

    fn retriever() -> Arc<FixedRetriever> {
        Arc::new(FixedRetriever {
            chunks: vec!["Refunds take 5 days.", "Shipping is free over $50."],
            queries: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn empty_history_skips_condense() {
        let provider = Arc::new(KeywordProvider::new(vec![], vec!["Refunds take 5 days."]));
        let retriever = retriever();
        let chain = RetrievalChain::new(retriever.clone(), provider.clone(), "gpt-4o-mini", 0.5);

        let out = chain.invoke("How long do refunds take?", &[]).await.unwrap();
        assert_eq!(out.answer, "Refunds take 5 days.");
        assert_eq!(out.query, "How long do refunds take?");
        assert_eq!(out.sources.len(), 2);

        let requests = provider.recorded();
        assert_eq!(requests.len(), 1);
        let system = &requests[0].messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("politely"));
        assert!(system.content.contains("Refunds take 5 days.\n\nShipping is free over $50."));
        assert_eq!(requests[0].messages.last().unwrap().content, "How long do refunds take?");
    }

    #[tokio::test]
    async fn preamble_only_history_skips_condense() {
        let provider = Arc::new(KeywordProvider::new(vec![], vec!["Refunds take 5 days."]));
        let retriever = retriever();
        let chain = RetrievalChain::new(retriever.clone(), provider.clone(), "gpt-4o-mini", 0.5);
        let history = vec![Message::system("You are a helpful assistant.")];

        let out = chain.invoke("How long do refunds take?", &history).await.unwrap();
        assert_eq!(out.query, "How long do refunds take?");
        assert_eq!(
            retriever.queries.lock().unwrap().as_slice(),
            ["How long do refunds take?"]
        );

        let requests = provider.recorded();
        assert_eq!(requests.len(), 1);
        // system + preamble + input
        assert_eq!(requests[0].messages.len(), 3);
    }

    #[tokio::test]
    async fn history_triggers_standalone_query() {
        let provider = Arc::new(KeywordProvider::new(
            vec![],
            vec!["Is shipping free for refunds?", "Yes, over $50."],
        ));
        let retriever = retriever();
        let chain = RetrievalChain::new(retriever.clone(), provider.clone(), "gpt-4o-mini", 0.5);
        let history = vec![
            Message::user("How long do refunds take?"),
            Message::assistant("Refunds take 5 days."),
        ];

        let out = chain.invoke("And is shipping free?", &history).await.unwrap();
        assert_eq!(out.answer, "Yes, over $50.");
        assert_eq!(out.query, "Is shipping free for refunds?");
        assert_eq!(
            retriever.queries.lock().unwrap().as_slice(),
            ["Is shipping free for refunds?"]
        );

        let requests = provider.recorded();
        assert_eq!(requests.len(), 2);
        // system + 2 history + input
        assert_eq!(requests[1].messages.len(), 4);
        assert_eq!(requests[1].messages[1].content, "How long do refunds take?");
    }

    #[tokio::test]
    async fn responder_returns_answer_text() {
        let provider = Arc::new(KeywordProvider::new(vec![], vec!["Hello!"]));
        let chain = RetrievalChain::new(retriever(), provider, "gpt-4o-mini", 0.5);
        let answer = chain.respond("hi", &[]).await.unwrap();
        assert_eq!(answer, "Hello!");
    }
}
