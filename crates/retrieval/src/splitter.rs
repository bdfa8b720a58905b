//! Character-based text splitting.
//!
//! Text is cut on a single separator and the pieces are greedily packed into
//! chunks of at most `chunk_size` characters. Consecutive chunks share up to
//! `chunk_overlap` characters worth of trailing pieces. A single piece longer
//! than `chunk_size` becomes its own oversized chunk rather than being cut
//! mid-line.

use tracing::warn;

/// Splits text on a separator and merges the pieces into sized chunks.
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterTextSplitter {
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            vec![text]
        } else {
            text.split(self.separator.as_str())
                .filter(|p| !p.is_empty())
                .collect()
        };
        self.merge(&pieces)
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = piece.chars().count();
            let joiner = |current: &[&str]| if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner(&current) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        size = total,
                        limit = self.chunk_size,
                        "Created a chunk larger than the configured size"
                    );
                }
                if !current.is_empty() {
                    self.push_joined(&current, &mut chunks);

                    // Drop leading pieces until we are within the overlap and
                    // the next piece fits.
                    while total > self.chunk_overlap
                        || (total + len + joiner(&current) > self.chunk_size && total > 0)
                    {
                        let first = current.remove(0).chars().count();
                        total -= first + if current.is_empty() { 0 } else { sep_len };
                        if current.is_empty() {
                            break;
                        }
                    }
                }
            }

            current.push(piece);
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        if !current.is_empty() {
            self.push_joined(&current, &mut chunks);
        }

        chunks
    }

    fn push_joined(&self, pieces: &[&str], chunks: &mut Vec<String>) {
        let joined = pieces.join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}
