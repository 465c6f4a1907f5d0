//! Sliding-window quote matcher

use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::index::{tokenize, VerseIndex};
use super::QuoteConfig;

/// A verse the speaker appears to be quoting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(rename = "ref")]
    pub reference: String,
    pub book_id: usize,
    pub chapter: u32,
    pub verse: u32,
    pub confidence: f32,
}

pub struct QuoteMatcher {
    config: QuoteConfig,
    index: Option<VerseIndex>,
    rolling: VecDeque<String>,
    last_quote: Option<(String, Instant)>,
}

impl QuoteMatcher {
    /// Unloaded matcher; every query returns nothing until an index is loaded
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            config,
            index: None,
            rolling: VecDeque::new(),
            last_quote: None,
        }
    }

    pub fn with_index(config: QuoteConfig, index: VerseIndex) -> Self {
        let mut matcher = Self::new(config);
        matcher.index = Some(index);
        matcher
    }

    /// Load both index artifacts from `dir`. On failure the matcher stays
    /// unloaded.
    pub fn load_index(&mut self, dir: &Path) -> bool {
        match VerseIndex::load(dir) {
            Ok(index) => {
                info!(
                    "✅ QuoteMatcher loaded: {} verses, {} first words",
                    index.len(),
                    index.first_words().len()
                );
                self.index = Some(index);
                true
            }
            Err(e) => {
                warn!("❌ Failed to load quote index: {}", e);
                self.index = None;
                false
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Append heard speech to the rolling buffer, keeping the newest tokens
    pub fn update_rolling_words(&mut self, text: &str) {
        self.rolling.extend(tokenize(text));
        while self.rolling.len() > self.config.buffer_words {
            self.rolling.pop_front();
        }
    }

    pub fn clear_buffer(&mut self) {
        self.rolling.clear();
    }

    /// Copy of the rolling buffer, oldest first
    pub fn buffer_state(&self) -> Vec<String> {
        self.rolling.iter().cloned().collect()
    }

    /// First sufficient match scanning buffer windows left to right, then
    /// candidates in index order, then positions within each verse
    pub fn find_quoted_verse(&self) -> Option<MatchResult> {
        let index = self.index.as_ref()?;
        let size = self.config.window;
        if size == 0 || self.rolling.len() < size {
            return None;
        }

        let words: Vec<&str> = self.rolling.iter().map(String::as_str).collect();

        for window in words.windows(size) {
            for verse in index.candidates(window[0]) {
                if verse.words.len() < size {
                    continue;
                }

                for slice in verse.words.windows(size) {
                    let matches = window
                        .iter()
                        .zip(slice)
                        .filter(|(heard, expected)| **heard == expected.as_str())
                        .count();

                    if matches >= self.config.min_matches {
                        return Some(MatchResult {
                            reference: verse.reference.clone(),
                            book_id: verse.book_id,
                            chapter: verse.chapter,
                            verse: verse.verse,
                            confidence: matches as f32 / size as f32,
                        });
                    }
                }
            }
        }

        None
    }

    /// `find_quoted_verse` with repeats of the last quote suppressed
    pub fn try_detect_quote(&mut self) -> Option<MatchResult> {
        let result = self.find_quoted_verse()?;
        let now = Instant::now();

        if let Some((last_ref, at)) = &self.last_quote {
            if *last_ref == result.reference && now.duration_since(*at) < self.config.debounce {
                debug!("⏭️ Quote debounced: {}", result.reference);
                return None;
            }
        }

        self.last_quote = Some((result.reference.clone(), now));
        info!(
            "📜 Quote detected: {} ({:.0}%)",
            result.reference,
            result.confidence * 100.0
        );
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::VerseIndexEntry;
    use std::time::Duration;

    const JOHN_3_16: &str = "For God so loved the world, that he gave his only begotten Son, \
        that whosoever believeth in him should not perish, but have everlasting life.";
    const JOHN_3_17: &str = "For God sent not his Son into the world to condemn the world; \
        but that the world through him might be saved.";

    fn entry(verse: u32, text: &str) -> VerseIndexEntry {
        VerseIndexEntry {
            reference: format!("John 3:{}", verse),
            book_id: 42,
            chapter: 3,
            verse,
            words: tokenize(text),
        }
    }

    fn matcher() -> QuoteMatcher {
        let index = VerseIndex::from_entries(vec![
            entry(15, "That whosoever believeth in him should not perish"),
            entry(16, JOHN_3_16),
            entry(17, JOHN_3_17),
            entry(18, "He that believeth"),
            entry(
                34,
                "For he whom God hath sent speaketh the words of God: \
                 for God giveth not the Spirit by measure unto him.",
            ),
        ]);
        QuoteMatcher::with_index(QuoteConfig::default(), index)
    }

    #[test]
    fn test_unloaded_fails_closed() {
        let mut m = QuoteMatcher::new(QuoteConfig::default());
        m.update_rolling_words(JOHN_3_16);
        assert!(!m.is_loaded());
        assert_eq!(m.find_quoted_verse(), None);
    }

    #[test]
    fn test_load_index_missing_dir() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut m = matcher();
        assert!(!m.load_index(dir.path()));
        assert!(!m.is_loaded());
    }

    #[test]
    fn test_load_index_from_artifacts() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        VerseIndex::from_entries(vec![entry(16, JOHN_3_16)])
            .save(dir.path())
            .unwrap();

        let mut m = QuoteMatcher::new(QuoteConfig::default());
        assert!(m.load_index(dir.path()));
        m.update_rolling_words("for god so loved the world that he gave");
        assert_eq!(m.find_quoted_verse().unwrap().verse, 16);
    }

    #[test]
    fn test_too_few_tokens() {
        let mut m = matcher();
        m.update_rolling_words("for god so loved the world");
        assert_eq!(m.buffer_state().len(), 6);
        assert_eq!(m.find_quoted_verse(), None);
    }

    #[test]
    fn test_exact_quote() {
        let mut m = matcher();
        m.update_rolling_words("and the pastor said for god so loved the world that he gave");
        let hit = m.find_quoted_verse().unwrap();
        assert_eq!(hit.reference, "John 3:16");
        assert_eq!(hit.book_id, 42);
        assert!((hit.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_one_mismatch_allowed() {
        let mut m = matcher();
        // "word" misheard for "world"
        m.update_rolling_words("for god so loved the word that");
        let hit = m.find_quoted_verse().unwrap();
        assert_eq!(hit.verse, 16);
        assert!((hit.confidence - 6.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_mismatches_rejected() {
        let mut m = matcher();
        m.update_rolling_words("for god so loved the word than");
        assert_eq!(m.find_quoted_verse(), None);
    }

    #[test]
    fn test_mid_verse_window() {
        let mut m = matcher();
        m.update_rolling_words("for god giveth not the spirit by");
        assert_eq!(m.find_quoted_verse().unwrap().verse, 34);
    }

    #[test]
    fn test_candidates_share_first_word() {
        // Verse 16 also contains this run but starts with "for"
        let mut m = matcher();
        m.update_rolling_words("that whosoever believeth in him should not");
        assert_eq!(m.find_quoted_verse().unwrap().verse, 15);
    }

    #[test]
    fn test_first_good_enough() {
        // The earlier window wins with one mismatch over a later exact quote
        let mut m = matcher();
        m.update_rolling_words("for god sent not his son unto for god so loved the world that");
        let hit = m.find_quoted_verse().unwrap();
        assert_eq!(hit.verse, 17);
        assert!(hit.confidence < 1.0);
    }

    #[test]
    fn test_short_verse_skipped() {
        let mut m = matcher();
        m.update_rolling_words("he that believeth on him is not condemned");
        assert_eq!(m.find_quoted_verse(), None);
    }

    #[test]
    fn test_rolling_buffer_truncates() {
        let mut m = matcher();
        let many: Vec<String> = (0..40).map(|i| format!("w{}", i)).collect();
        m.update_rolling_words(&many.join(" "));
        // Digits are stripped, every token becomes "w"
        let state = m.buffer_state();
        assert_eq!(state.len(), 30);

        m.clear_buffer();
        m.update_rolling_words("alpha beta");
        assert_eq!(m.buffer_state(), vec!["alpha", "beta"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_debounce() {
        let mut m = matcher();
        m.update_rolling_words("for god so loved the world that");
        assert!(m.try_detect_quote().is_some());

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(m.try_detect_quote().is_none());

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(m.try_detect_quote().is_some());
    }
}
