//! BPE token counting via tiktoken.
//!
//! Budgets are measured with `cl100k_base`, the encoding of the hosted chat
//! models. When the encoder cannot be loaded the character heuristic from
//! core is used instead.

use std::sync::Arc;
use supportdesk_core::{ApproximateTokenizer, Tokenizer};
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Exact token counts using the `cl100k_base` encoding.
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    pub fn cl100k() -> supportdesk_core::Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| supportdesk_core::Error::Internal(format!("cl100k_base: {e}")))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// The tokenizer sessions use by default.
pub fn default_tokenizer() -> Arc<dyn Tokenizer> {
    match TiktokenCounter::cl100k() {
        Ok(counter) => Arc::new(counter),
        Err(e) => {
            warn!("Falling back to approximate token counts: {e}");
            Arc::new(ApproximateTokenizer)
        }
    }
}
