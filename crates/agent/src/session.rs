//! Per-session chat state.
//!
//! A [`ChatSession`] owns everything that changes during one conversation:
//! the displayed transcript, the token-bounded history ledger, the feedback
//! state for the latest answer, the answer mode, and the FAQ selection.
//! Shared, immutable pieces live in [`crate::SupportDesk`].

use supportdesk_core::Turn;

use crate::context::HistoryLedger;
use crate::faq::FaqSelection;
use crate::feedback::FeedbackTracker;
use crate::router::Mode;

#[derive(Debug)]
pub struct ChatSession {
    id: String,
    pub mode: Mode,
    pub(crate) transcript: Vec<Turn>,
    pub(crate) ledger: HistoryLedger,
    pub(crate) feedback: FeedbackTracker,
    pub faq: FaqSelection,
}

impl ChatSession {
    pub fn new(mode: Mode, ledger: HistoryLedger) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode,
            transcript: Vec::new(),
            ledger,
            feedback: FeedbackTracker::new(),
            faq: FaqSelection::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Turns shown to the user, in display order.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn feedback(&self) -> &FeedbackTracker {
        &self.feedback
    }

    /// Render hook for the front end: the feedback caption to show now.
    pub fn feedback_caption(&mut self) -> Option<&'static str> {
        self.feedback.on_render()
    }

    /// Start over: empty transcript and history, feedback idle.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.ledger.clear();
        self.feedback = FeedbackTracker::new();
        self.faq.clear();
    }
}
