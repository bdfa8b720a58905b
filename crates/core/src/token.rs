//! Token counting.
//!
//! The history budget and the input-size check are both expressed in tokens.
//! [`Tokenizer`] abstracts the encoder so the ledger can be tested with a
//! deterministic counter and run against the model's real BPE encoding.

/// Counts tokens in a span of text.
pub trait Tokenizer: Send + Sync {
    /// Number of tokens `text` encodes to. Empty text is zero tokens.
    fn count_tokens(&self, text: &str) -> usize;
}

/// Character heuristic: one token per four characters, rounded up.
///
/// Within ~10% of BPE encoders on English text; used when no encoder is
/// available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTokenizer;

impl Tokenizer for ApproximateTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}
