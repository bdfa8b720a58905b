//! The support desk: shared answering machinery plus the per-message handler.
//!
//! Built once at start-up. Every corpus index is built or loaded here, so a
//! missing or empty corpus stops start-up rather than failing mid-chat.

use std::sync::Arc;
use supportdesk_config::{AppConfig, CorpusConfig, FeedbackSinkKind, SessionConfig};
use supportdesk_core::{Provider, Tokenizer, Turn};
use supportdesk_retrieval::{Responder, RetrievalChain, build_index};
use supportdesk_tools::build_registry;
use tracing::info;

use crate::context::{HistoryLedger, default_tokenizer};
use crate::error::{FeedbackError, RouterError};
use crate::faq::FaqTree;
use crate::feedback::{FeedbackSink, FeedbackSubject, JsonlFeedbackSink, LogFeedbackSink};
use crate::patterns::ReactAgent;
use crate::router::{AnswerRouter, Mode};
use crate::session::ChatSession;

pub struct SupportDesk {
    router: AnswerRouter,
    sink: Arc<dyn FeedbackSink>,
    faq: Option<Arc<FaqTree>>,
    tokenizer: Arc<dyn Tokenizer>,
    session: SessionConfig,
}

impl SupportDesk {
    pub fn new(router: AnswerRouter, sink: Arc<dyn FeedbackSink>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            router,
            sink,
            faq: None,
            tokenizer,
            session: SessionConfig::default(),
        }
    }

    pub fn with_session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_faq(mut self, faq: FaqTree) -> Self {
        self.faq = Some(Arc::new(faq));
        self
    }

    /// Build everything the configuration describes: indexes, chains, tools,
    /// the agent, the feedback sink and the FAQ.
    pub async fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
    ) -> supportdesk_core::Result<Self> {
        let default_chain = Self::chain_for(config, &config.default_corpus, provider.clone()).await?;

        let mut corpora: Vec<(CorpusConfig, Arc<dyn Responder>)> = Vec::new();
        for corpus in &config.corpora {
            let chain = Self::chain_for(config, corpus, provider.clone()).await?;
            corpora.push((corpus.clone(), chain));
        }

        let registry = build_registry(config, corpora);
        let agent = ReactAgent::new(provider, &config.model, config.temperature, Arc::new(registry))
            .with_config(&config.agent);
        let router = AnswerRouter::new(default_chain, Arc::new(agent));

        let sink: Arc<dyn FeedbackSink> = match (config.feedback.sink, &config.feedback.path) {
            (FeedbackSinkKind::Jsonl, Some(path)) => Arc::new(JsonlFeedbackSink::new(path)),
            (FeedbackSinkKind::Jsonl, None) => {
                return Err(supportdesk_core::Error::Config {
                    message: "feedback.sink = \"jsonl\" requires feedback.path".into(),
                });
            }
            (FeedbackSinkKind::Log, _) => Arc::new(LogFeedbackSink),
        };

        let mut desk = Self::new(router, sink, default_tokenizer())
            .with_session_config(config.session.clone());

        if let Some(path) = &config.faq_path {
            let tree = FaqTree::load(path).map_err(|e| supportdesk_core::Error::Config {
                message: format!("{}: {e}", path.display()),
            })?;
            desk = desk.with_faq(tree);
        }

        info!(
            corpora = config.corpora.len(),
            tools = desk.router.agent().tools().len(),
            faq = desk.faq.is_some(),
            "Support desk ready"
        );
        Ok(desk)
    }

    async fn chain_for(
        config: &AppConfig,
        corpus: &CorpusConfig,
        provider: Arc<dyn Provider>,
    ) -> supportdesk_core::Result<Arc<dyn Responder>> {
        let retriever = build_index(corpus, &config.retrieval, &config.embedding_model, provider.clone()).await?;
        Ok(Arc::new(RetrievalChain::new(
            Arc::new(retriever),
            provider,
            &config.model,
            config.temperature,
        )))
    }

    /// Open a session in the configured default mode.
    pub fn new_session(&self) -> ChatSession {
        self.new_session_with_mode(Mode::from_agent_flag(self.session.agent_by_default))
    }

    pub fn new_session_with_mode(&self, mode: Mode) -> ChatSession {
        let mut ledger = HistoryLedger::new(self.session.max_allowed_tokens, self.tokenizer.clone());
        if let Some(preamble) = &self.session.preamble {
            ledger = ledger.with_preamble(preamble.clone());
        }
        ChatSession::new(mode, ledger)
    }

    pub fn faq(&self) -> Option<&FaqTree> {
        self.faq.as_deref()
    }

    /// Tools available to the agent, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.router.agent().tools().names()
    }

    /// Answer one user message in the session.
    ///
    /// On success the exchange is added to the transcript and feedback is
    /// requested for it. On failure only the feedback state changes (to idle).
    pub async fn handle_message(
        &self,
        session: &mut ChatSession,
        input: &str,
    ) -> Result<String, RouterError> {
        session.feedback.on_user_message();

        let answer = self
            .router
            .answer(input, session.mode, &mut session.ledger)
            .await?;

        session.transcript.push(Turn::user(input));
        session.transcript.push(Turn::assistant(answer.clone()));

        let subject = FeedbackSubject {
            session_id: session.id().to_string(),
            turn_index: session.transcript.len() - 1,
            question: input.to_string(),
            answer: answer.clone(),
        };
        session.feedback.on_answer(subject);

        Ok(answer)
    }

    pub fn choose_yes(&self, session: &mut ChatSession) -> Result<(), FeedbackError> {
        session.feedback.choose_yes(self.sink.as_ref())
    }

    pub fn choose_no(&self, session: &mut ChatSession) -> Result<(), FeedbackError> {
        session.feedback.choose_no()
    }

    pub fn submit_reason(
        &self,
        session: &mut ChatSession,
        reason: &str,
    ) -> Result<(), FeedbackError> {
        session.feedback.submit_reason(reason, self.sink.as_ref())
    }

    /// Drop any pending feedback prompt without recording anything, so the
    /// next line is treated as a new question.
    pub fn skip_feedback(&self, session: &mut ChatSession) {
        session.feedback.on_user_message();
    }
}
