//! The answering side of SupportDesk.
//!
//! Each user turn follows one of two paths, chosen per session:
//!
//! 1. **RAG** (default): condense the question against history, retrieve
//!    chunks from the combined corpus, answer from them.
//! 2. **Agent**: a ReAct loop that picks among the corpus tools and web
//!    search until it can give a final answer.
//!
//! Either way the exchange lands in a token-bounded [`HistoryLedger`], and
//! the answer opens a feedback prompt tracked by [`FeedbackTracker`].
//! [`SupportDesk`] ties the pieces together for a front end.

pub mod context;
pub mod desk;
pub mod error;
pub mod faq;
pub mod feedback;
pub mod patterns;
pub mod router;
pub mod session;

pub use context::{HistoryLedger, Scratchpad, TiktokenCounter, default_tokenizer};
pub use desk::SupportDesk;
pub use error::{AgentError, FaqError, FeedbackError, RouterError};
pub use faq::{FaqNode, FaqSelection, FaqTree};
pub use feedback::{
    FeedbackRecord, FeedbackSink, FeedbackState, FeedbackSubject, FeedbackTracker,
    JsonlFeedbackSink, LogFeedbackSink, Verdict,
};
pub use patterns::{AgentOutcome, ReactAgent};
pub use router::{AnswerRouter, Mode};
pub use session::ChatSession;
