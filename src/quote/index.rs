//! Verse index artifacts
//!
//! `bible_index.json` holds every verse's tokens in canonical order;
//! `bible_first_word_index.json` maps a token to the positions of the
//! verses that start with it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{VerseError, VerseResult};

pub const VERSE_INDEX_FILE: &str = "bible_index.json";
pub const FIRST_WORD_INDEX_FILE: &str = "bible_first_word_index.json";

/// One tokenized verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseIndexEntry {
    /// Display reference, e.g. `John 3:16`
    #[serde(rename = "ref")]
    pub reference: String,
    pub book_id: usize,
    pub chapter: u32,
    pub verse: u32,
    pub words: Vec<String>,
}

/// Token → positions in the verse list of verses starting with that token
pub type FirstWordIndex = BTreeMap<String, Vec<usize>>;

/// Lowercase, keep only `a-z` and whitespace, split on whitespace
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// The verse list plus its first-word lookup
#[derive(Debug, Clone, Default)]
pub struct VerseIndex {
    entries: Vec<VerseIndexEntry>,
    first_words: FirstWordIndex,
}

impl VerseIndex {
    /// Build the first-word lookup for an ordered verse list
    pub fn from_entries(entries: Vec<VerseIndexEntry>) -> Self {
        let mut first_words = FirstWordIndex::new();
        for (i, entry) in entries.iter().enumerate() {
            if let Some(first) = entry.words.first() {
                first_words.entry(first.clone()).or_default().push(i);
            }
        }
        Self {
            entries,
            first_words,
        }
    }

    /// Pair loaded artifacts, rejecting a first-word index that points
    /// outside the verse list (artifacts from different corpus builds)
    pub fn from_parts(
        entries: Vec<VerseIndexEntry>,
        first_words: FirstWordIndex,
    ) -> VerseResult<Self> {
        for (word, positions) in &first_words {
            if let Some(&bad) = positions.iter().find(|&&p| p >= entries.len()) {
                return Err(VerseError::Index(format!(
                    "first-word '{}' points at verse {} but only {} verses are indexed",
                    word,
                    bad,
                    entries.len()
                )));
            }
        }
        Ok(Self {
            entries,
            first_words,
        })
    }

    pub fn entries(&self) -> &[VerseIndexEntry] {
        &self.entries
    }

    pub fn first_words(&self) -> &FirstWordIndex {
        &self.first_words
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verses whose first token is `word`
    pub fn candidates<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a VerseIndexEntry> + 'a {
        self.first_words
            .get(word)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.entries.get(i))
    }

    /// Write both artifacts into `dir`
    pub fn save(&self, dir: &Path) -> VerseResult<()> {
        std::fs::create_dir_all(dir)?;

        let verses_path = dir.join(VERSE_INDEX_FILE);
        std::fs::write(&verses_path, serde_json::to_string_pretty(&self.entries)?)?;

        let first_path = dir.join(FIRST_WORD_INDEX_FILE);
        std::fs::write(&first_path, serde_json::to_string_pretty(&self.first_words)?)?;

        info!(
            "✅ Verse index written: {} verses, {} first words -> {:?}",
            self.entries.len(),
            self.first_words.len(),
            dir
        );
        Ok(())
    }

    /// Read both artifacts from `dir`
    pub fn load(dir: &Path) -> VerseResult<Self> {
        let verses_path = dir.join(VERSE_INDEX_FILE);
        let first_path = dir.join(FIRST_WORD_INDEX_FILE);

        if !verses_path.exists() || !first_path.exists() {
            return Err(VerseError::Index(format!(
                "index files not found in {:?}; run build-index first",
                dir
            )));
        }

        let entries: Vec<VerseIndexEntry> =
            serde_json::from_str(&std::fs::read_to_string(&verses_path)?)?;
        let first_words: FirstWordIndex =
            serde_json::from_str(&std::fs::read_to_string(&first_path)?)?;

        Self::from_parts(entries, first_words)
    }
}
