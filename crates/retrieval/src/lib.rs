//! Document indexing and retrieval for SupportDesk.
//!
//! A corpus folder goes through four steps before it can answer questions:
//!
//! 1. **Load** supported files into plain-text [`Document`]s
//! 2. **Split** them into overlapping chunks on newline boundaries
//! 3. **Embed** every chunk through the configured provider
//! 4. **Persist** the vectors to a named on-disk store
//!
//! The resulting [`VectorRetriever`] is read-only for the rest of the
//! process. A [`RetrievalChain`] wraps a retriever with a chat model to
//! answer a question in the context of the conversation so far.

pub mod chain;
pub mod index;
pub mod loader;
pub mod splitter;
pub mod store;
pub mod vector;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chain::{ChainOutput, Responder, RetrievalChain};
pub use index::{RetrievedChunk, Retriever, VectorRetriever, build_index, rebuild_index};
pub use loader::{Document, load_documents};
pub use splitter::CharacterTextSplitter;
pub use store::{IndexStore, StoredChunk};
