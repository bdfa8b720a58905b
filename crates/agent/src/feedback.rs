//! Feedback collection for the latest answer.
//!
//! ```text
//!            on_answer                choose_no             submit_reason
//!  Idle ───────────────▶ AwaitingChoice ───────▶ AwaitingReason ───────▶ ReasonRecorded
//!   ▲                        │ choose_yes                                     │
//!   │                        ▼                                                │ on_render
//!   │                    Satisfied                                            │
//!   └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `on_answer` enters `AwaitingChoice` from any state and `on_user_message`
//! returns to `Idle` from any state; a pending reason is dropped unrecorded.
//! Every other event outside the arrows above is an invalid transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::error::FeedbackError;

pub const ASK_HELPFUL: &str = "Was this answer helpful? [y/n]";
pub const THANKS_SATISFIED: &str =
    "Glad we could help! Feel free to ask if you have any other questions.";
pub const ASK_REASON: &str = "We're sorry the answer didn't meet your expectations. \
To help us improve, could you tell us why you weren't satisfied?";
pub const THANKS_REASON: &str = "Thank you very much for your feedback.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedbackState {
    #[default]
    Idle,
    AwaitingChoice,
    Satisfied,
    AwaitingReason,
    ReasonRecorded { reason: String },
}

impl FeedbackState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AwaitingChoice => "AwaitingChoice",
            Self::Satisfied => "Satisfied",
            Self::AwaitingReason => "AwaitingReason",
            Self::ReasonRecorded { .. } => "ReasonRecorded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Yes,
    No,
}

/// The exchange feedback refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubject {
    pub session_id: String,
    /// Position of the answer in the session transcript
    pub turn_index: usize,
    pub question: String,
    pub answer: String,
}

/// One recorded verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(flatten)]
    pub subject: FeedbackSubject,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Where verdicts go.
pub trait FeedbackSink: Send + Sync {
    fn record(&self, record: &FeedbackRecord) -> Result<(), FeedbackError>;
}

/// Writes each verdict to the log.
#[derive(Debug, Default)]
pub struct LogFeedbackSink;

impl FeedbackSink for LogFeedbackSink {
    fn record(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        info!(
            session = %record.subject.session_id,
            turn = record.subject.turn_index,
            verdict = ?record.verdict,
            reason = record.reason.as_deref().unwrap_or(""),
            "Feedback recorded"
        );
        Ok(())
    }
}

/// Appends each verdict as one JSON line.
pub struct JsonlFeedbackSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlFeedbackSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedbackSink for JsonlFeedbackSink {
    fn record(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        let line = serde_json::to_string(record).map_err(|e| FeedbackError::Sink(e.to_string()))?;
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FeedbackError::Sink("feedback file lock poisoned".into()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| FeedbackError::Sink(e.to_string()))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FeedbackError::Sink(format!("{}: {e}", self.path.display())))?;
        writeln!(file, "{line}").map_err(|e| FeedbackError::Sink(e.to_string()))?;
        Ok(())
    }
}

/// Feedback state for the latest answer of one session.
#[derive(Debug, Clone, Default)]
pub struct FeedbackTracker {
    state: FeedbackState,
    subject: Option<FeedbackSubject>,
}

impl FeedbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    pub fn subject(&self) -> Option<&FeedbackSubject> {
        self.subject.as_ref()
    }

    /// A new answer was shown.
    pub fn on_answer(&mut self, subject: FeedbackSubject) {
        self.subject = Some(subject);
        self.state = FeedbackState::AwaitingChoice;
    }

    /// The user sent a new message.
    pub fn on_user_message(&mut self) {
        self.state = FeedbackState::Idle;
    }

    pub fn choose_yes(&mut self, sink: &dyn FeedbackSink) -> Result<(), FeedbackError> {
        self.expect(FeedbackState::AwaitingChoice, "choose yes")?;
        sink.record(&self.record(Verdict::Yes, None)?)?;
        self.state = FeedbackState::Satisfied;
        Ok(())
    }

    pub fn choose_no(&mut self) -> Result<(), FeedbackError> {
        self.expect(FeedbackState::AwaitingChoice, "choose no")?;
        self.state = FeedbackState::AwaitingReason;
        Ok(())
    }

    pub fn submit_reason(
        &mut self,
        reason: impl Into<String>,
        sink: &dyn FeedbackSink,
    ) -> Result<(), FeedbackError> {
        self.expect(FeedbackState::AwaitingReason, "submit a reason")?;
        let reason = reason.into();
        sink.record(&self.record(Verdict::No, Some(reason.clone()))?)?;
        self.state = FeedbackState::ReasonRecorded { reason };
        Ok(())
    }

    /// The current state was shown to the user. Returns the caption to show;
    /// a recorded reason is acknowledged once and then cleared.
    pub fn on_render(&mut self) -> Option<&'static str> {
        match self.state {
            FeedbackState::Idle => None,
            FeedbackState::AwaitingChoice => Some(ASK_HELPFUL),
            FeedbackState::Satisfied => Some(THANKS_SATISFIED),
            FeedbackState::AwaitingReason => Some(ASK_REASON),
            FeedbackState::ReasonRecorded { .. } => {
                self.state = FeedbackState::Idle;
                Some(THANKS_REASON)
            }
        }
    }

    fn expect(&self, wanted: FeedbackState, event: &'static str) -> Result<(), FeedbackError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(FeedbackError::InvalidTransition {
                state: self.state.name(),
                event,
            })
        }
    }

    fn record(&self, verdict: Verdict, reason: Option<String>) -> Result<FeedbackRecord, FeedbackError> {
        let subject = self
            .subject
            .clone()
            .ok_or_else(|| FeedbackError::Sink("no answer to attach feedback to".into()))?;
        Ok(FeedbackRecord {
            subject,
            verdict,
            reason,
            timestamp: Utc::now(),
        })
    }
}
