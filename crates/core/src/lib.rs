//! # SupportDesk Core
//!
//! Domain types, traits, and error definitions for the SupportDesk
//! customer-support back end. This crate has **no framework dependencies**;
//! it defines the model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (LLM provider, agent tool) is a trait here.
//! Implementations live in their own crates, so tests can swap in scripted
//! mocks and the dependency graph points inward at core.

pub mod error;
pub mod message;
pub mod provider;
pub mod token;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use token::{ApproximateTokenizer, Tokenizer};
pub use tool::{Tool, ToolOutput, ToolRegistry};
