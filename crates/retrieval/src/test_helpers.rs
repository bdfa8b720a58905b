//! Shared mock provider for retrieval tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use supportdesk_core::error::ProviderError;
use supportdesk_core::message::Message;
use supportdesk_core::provider::*;

/// Embeds text as keyword counts over a fixed vocabulary and answers
/// completions from a script, recording every request.
pub struct KeywordProvider {
    vocab: Vec<&'static str>,
    responses: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<ProviderRequest>>,
    pub embed_calls: AtomicUsize,
}

impl KeywordProvider {
    pub fn new(vocab: Vec<&'static str>, responses: Vec<&str>) -> Self {
        Self {
            vocab,
            responses: Mutex::new(responses.into_iter().rev().map(String::from).collect()),
            requests: Mutex::new(Vec::new()),
            embed_calls: AtomicUsize::new(0),
        }
    }

    pub fn embed_call_count(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        self.vocab
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Provider for KeywordProvider {
    fn name(&self) -> &str {
        "keyword_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| "No more scripted responses".into());
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: request.model,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| self.vectorize(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}
