//! Verse Index Builder
//!
//! Offline step turning the verse corpus into the two artifacts the quote
//! matcher loads. Re-run whenever the corpus changes.

use std::path::Path;
use tracing::{info, warn};

use super::index::{tokenize, VerseIndex, VerseIndexEntry};
use crate::corpus::{CorpusVerse, VerseSource};
use crate::error::VerseResult;

#[derive(Debug, Default)]
pub struct VerseIndexBuilder {
    verses: Vec<CorpusVerse>,
}

impl VerseIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(source: &dyn VerseSource) -> VerseResult<Self> {
        let verses = source.all_verses()?;
        info!("📊 Found {} verses", verses.len());
        Ok(Self { verses })
    }

    pub fn add(&mut self, verse: CorpusVerse) -> &mut Self {
        self.verses.push(verse);
        self
    }

    /// Tokenize every verse in canonical (book, chapter, verse) order
    pub fn build(&self) -> VerseIndex {
        let mut ordered: Vec<&CorpusVerse> = self.verses.iter().collect();
        ordered.sort_by_key(|v| (v.book_id, v.chapter, v.verse));

        let entries: Vec<VerseIndexEntry> = ordered
            .into_iter()
            .map(|v| VerseIndexEntry {
                reference: v.reference(),
                book_id: v.book_id,
                chapter: v.chapter,
                verse: v.verse,
                words: tokenize(&v.text),
            })
            .collect();

        let empty = entries.iter().filter(|e| e.words.is_empty()).count();
        if empty > 0 {
            warn!("⚠️ {} verses have no indexable words", empty);
        }

        VerseIndex::from_entries(entries)
    }

    /// Build and write both artifacts into `dir`
    pub fn write(&self, dir: &Path) -> VerseResult<VerseIndex> {
        let index = self.build();
        index.save(dir)?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{BibleDb, InMemoryBible};
    use crate::quote::index::{FIRST_WORD_INDEX_FILE, VERSE_INDEX_FILE};

    #[test]
    fn test_canonical_order() {
        let mut builder = VerseIndexBuilder::new();
        builder
            .add(CorpusVerse::new(42, 11, 35, "Jesus wept."))
            .add(CorpusVerse::new(42, 3, 16, "For God so loved the world"))
            .add(CorpusVerse::new(0, 1, 1, "In the beginning"))
            .add(CorpusVerse::new(42, 3, 2, "The same came to Jesus by night"));

        let index = builder.build();
        let refs: Vec<&str> = index.entries().iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(refs, vec!["Genesis 1:1", "John 3:2", "John 3:16", "John 11:35"]);
        assert_eq!(index.entries()[3].words, vec!["jesus", "wept"]);
        assert_eq!(index.first_words()["jesus"], vec![3]);
        assert_eq!(index.first_words()["for"], vec![2]);
    }

    #[test]
    fn test_empty_verse_not_in_first_word_index() {
        let mut builder = VerseIndexBuilder::new();
        builder.add(CorpusVerse::new(18, 119, 1, "1:1 -- "));
        let index = builder.build();
        assert_eq!(index.len(), 1);
        assert!(index.first_words().is_empty());
    }

    #[test]
    fn test_write_from_in_memory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bible: InMemoryBible = vec![
            CorpusVerse::new(42, 11, 35, "Jesus wept."),
            CorpusVerse::new(42, 3, 16, "For God so loved the world"),
        ]
        .into_iter()
        .collect();

        VerseIndexBuilder::from_source(&bible)
            .unwrap()
            .write(dir.path())
            .unwrap();

        assert!(dir.path().join(VERSE_INDEX_FILE).exists());
        assert!(dir.path().join(FIRST_WORD_INDEX_FILE).exists());
        assert_eq!(VerseIndex::load(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_write_from_bible_db() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = BibleDb::create(dir.path().join("bible.db")).unwrap();
        db.insert_verses(&[
            CorpusVerse::new(44, 8, 28, "And we know that all things work together for good"),
            CorpusVerse::new(44, 8, 1, "There is therefore now no condemnation"),
        ])
        .unwrap();

        let out = dir.path().join("index");
        let index = VerseIndexBuilder::from_source(&db).unwrap().write(&out).unwrap();
        assert_eq!(index.entries()[0].reference, "Romans 8:1");
        assert_eq!(index.entries()[1].book_id, 44);
        assert_eq!(VerseIndex::load(&out).unwrap().entries(), index.entries());
    }
}
