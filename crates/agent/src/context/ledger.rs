//! History ledger: the conversation history handed to the retrieval chains,
//! bounded by a token ceiling.
//!
//! # Accounting
//!
//! Every entry is charged the token count of its content, with no per-message
//! overhead. The running total always equals the sum over the retained
//! entries, including the optional preamble.
//!
//! # Eviction
//!
//! `trim()` drops whole entries from the front, oldest first, until the total
//! is within the ceiling. Two kinds of entry are never evicted:
//!
//! - the preamble (a fixed leading system message, if set)
//! - the exchange appended most recently
//!
//! So a single exchange larger than the ceiling is kept on its own and the
//! total stays over budget until the next exchange pushes it out.

use std::collections::VecDeque;
use std::sync::Arc;
use supportdesk_core::{Message, Tokenizer};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    message: Message,
    tokens: usize,
}

pub struct HistoryLedger {
    preamble: Option<Entry>,
    entries: VecDeque<Entry>,
    total: usize,
    ceiling: usize,
    /// Trailing entries belonging to the latest exchange
    pinned: usize,
    tokenizer: Arc<dyn Tokenizer>,
}

impl HistoryLedger {
    pub fn new(ceiling: usize, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            preamble: None,
            entries: VecDeque::new(),
            total: 0,
            ceiling,
            pinned: 0,
            tokenizer,
        }
    }

    /// Set a fixed leading system message. It counts toward the total but is
    /// never evicted.
    pub fn with_preamble(mut self, text: impl Into<String>) -> Self {
        let message = Message::system(text);
        let tokens = self.tokenizer.count_tokens(&message.content);
        if let Some(old) = self.preamble.replace(Entry { message, tokens }) {
            self.total -= old.tokens;
        }
        self.total += tokens;
        self
    }

    /// Count tokens with this ledger's tokenizer.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.count_tokens(text)
    }

    /// Record a user/assistant exchange.
    pub fn append(&mut self, user_text: &str, assistant_text: &str) {
        self.push(Message::user(user_text));
        self.push(Message::assistant(assistant_text));
        self.pinned = 2;
    }

    /// Record messages produced by tools, in order. The last user/assistant
    /// pair of the delta becomes the pinned exchange.
    pub fn apply(&mut self, delta: Vec<Message>) {
        if delta.is_empty() {
            return;
        }
        let added = delta.len();
        for message in delta {
            self.push(message);
        }
        self.pinned = added.min(2);
    }

    fn push(&mut self, message: Message) {
        let tokens = self.tokenizer.count_tokens(&message.content);
        self.total += tokens;
        self.entries.push_back(Entry { message, tokens });
    }

    /// Evict oldest entries until the total is within the ceiling or only
    /// protected entries remain. Returns the number of entries evicted.
    pub fn trim(&mut self) -> usize {
        let mut evicted = 0;
        while self.total > self.ceiling && self.entries.len() > self.pinned {
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            self.total -= entry.tokens;
            evicted += 1;
        }

        if evicted > 0 {
            debug!(
                evicted,
                remaining = self.entries.len(),
                total = self.total,
                ceiling = self.ceiling,
                "Trimmed conversation history"
            );
        }
        evicted
    }

    /// All retained messages, preamble first.
    pub fn messages(&self) -> Vec<Message> {
        self.preamble
            .iter()
            .chain(self.entries.iter())
            .map(|e| e.message.clone())
            .collect()
    }

    /// Number of retained messages, including the preamble.
    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.preamble.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn token_total(&self) -> usize {
        self.total
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Drop the conversation, keeping the preamble.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pinned = 0;
        self.total = self.preamble.as_ref().map_or(0, |p| p.tokens);
    }
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLedger")
            .field("len", &self.len())
            .field("total", &self.total)
            .field("ceiling", &self.ceiling)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_helpers::WordTokenizer;
    use supportdesk_core::Role;

    fn ledger(ceiling: usize) -> HistoryLedger {
        HistoryLedger::new(ceiling, Arc::new(WordTokenizer))
    }

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    fn contents(ledger: &HistoryLedger) -> Vec<String> {
        ledger.messages().into_iter().map(|m| m.content).collect()
    }

    #[test]
    fn append_counts_both_messages() {
        let mut l = ledger(100);
        l.append("how are you", "fine thanks");
        assert_eq!(l.len(), 2);
        assert_eq!(l.token_total(), 5);
        let messages = l.messages();
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[test]
    fn oversized_single_exchange_is_kept() {
        let mut l = ledger(1000);
        l.append(&words(600), &words(600));
        assert_eq!(l.trim(), 0);
        assert_eq!(l.token_total(), 1200);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn oversized_exchange_evicts_everything_else() {
        let mut l = ledger(1000);
        l.append(&words(50), &words(50));
        l.append(&words(600), &words(600));
        assert_eq!(l.trim(), 2);
        assert_eq!(l.token_total(), 1200);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn trims_back_under_ceiling() {
        let mut l = ledger(1000);
        // 900 tokens across three exchanges
        l.append(&words(100), &words(200));
        l.append(&words(150), &words(150));
        l.append(&words(100), &words(200));
        assert_eq!(l.token_total(), 900);

        l.append(&words(75), &words(75));
        assert_eq!(l.token_total(), 1050);

        assert_eq!(l.trim(), 1);
        assert_eq!(l.token_total(), 950);
        assert!(l.token_total() <= l.ceiling());
    }

    #[test]
    fn eviction_is_fifo() {
        let mut l = ledger(6);
        l.append("A", "B");
        l.append("C", "D");
        l.append("E", "F");
        l.append("G", "H");
        l.trim();
        assert_eq!(contents(&l), vec!["C", "D", "E", "F", "G", "H"]);
        l.append("I", "J");
        l.trim();
        assert_eq!(contents(&l), vec!["E", "F", "G", "H", "I", "J"]);
    }

    #[test]
    fn preamble_is_counted_but_never_evicted() {
        let mut l = ledger(5).with_preamble("be polite");
        assert_eq!(l.token_total(), 2);
        l.append("one two", "three");
        l.append("four", "five six");
        l.trim();
        assert_eq!(contents(&l), vec!["be polite", "four", "five six"]);
        assert_eq!(l.token_total(), 5);
        assert_eq!(l.messages()[0].role, Role::System);
    }

    #[test]
    fn apply_tool_deltas_in_order() {
        let mut l = ledger(100);
        l.apply(vec![Message::user("q1"), Message::assistant("a1")]);
        l.apply(vec![Message::user("q2"), Message::assistant("a2")]);
        assert_eq!(contents(&l), vec!["q1", "a1", "q2", "a2"]);
        assert_eq!(l.token_total(), 4);
    }

    #[test]
    fn apply_pins_only_last_pair() {
        let mut l = ledger(2);
        l.apply(vec![
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
        ]);
        assert_eq!(l.trim(), 2);
        assert_eq!(contents(&l), vec!["q2", "a2"]);
    }

    #[test]
    fn empty_delta_changes_nothing() {
        let mut l = ledger(100);
        l.append("q", "a");
        l.apply(Vec::new());
        assert_eq!(l.len(), 2);
        assert_eq!(l.token_total(), 2);
    }

    #[test]
    fn clear_keeps_preamble() {
        let mut l = ledger(100).with_preamble("system rules");
        l.append("q", "a");
        l.clear();
        assert_eq!(l.len(), 1);
        assert_eq!(l.token_total(), 2);
    }
}
