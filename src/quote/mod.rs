//! Quotation detection
//!
//! Recognizes when the speaker recites consecutive words of a verse
//! without naming the reference.

pub mod builder;
pub mod index;
pub mod matcher;

use std::time::Duration;

pub use builder::VerseIndexBuilder;
pub use index::{tokenize, FirstWordIndex, VerseIndex, VerseIndexEntry};
pub use matcher::{MatchResult, QuoteMatcher};

/// Sliding-window parameters for quote matching
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// Tokens compared per window
    pub window: usize,
    /// Position-wise equal tokens required for a match
    pub min_matches: usize,
    /// Rolling buffer length in tokens
    pub buffer_words: usize,
    /// Suppress the same quote within this window
    pub debounce: Duration,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            window: 7,
            min_matches: 6,
            buffer_words: 30,
            debounce: Duration::from_millis(1500),
        }
    }
}
