//! Conversation context for answering a turn.
//!
//! | Piece | Lifetime | Bound |
//! |-------|----------|-------|
//! | [`HistoryLedger`] | Session | Token ceiling, oldest evicted first |
//! | [`Scratchpad`] | One agent run | Iteration limit |
//!
//! Token counts come from a [`supportdesk_core::Tokenizer`]; [`token`]
//! provides the BPE counter used in production.

pub mod ledger;
pub mod scratchpad;
pub mod token;

pub use ledger::HistoryLedger;
pub use scratchpad::{AgentAction, AgentStep, Scratchpad, TraceEntry, TraceKind};
pub use token::{TiktokenCounter, default_tokenizer};
