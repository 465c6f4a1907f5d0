//! Verse corpus access
//!
//! The corpus is a SQLite table `bible(Book, Chapter, Versecount, verse)`
//! where `Book` is the 0-based canonical book id.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::{book_id, book_name};
use crate::error::{VerseError, VerseResult};

/// One verse of the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusVerse {
    pub book_id: usize,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl CorpusVerse {
    pub fn new(book_id: usize, chapter: u32, verse: u32, text: impl Into<String>) -> Self {
        Self {
            book_id,
            chapter,
            verse,
            text: text.into(),
        }
    }

    /// `John 3:16`; unknown ids render as `Book N`
    pub fn reference(&self) -> String {
        match book_name(self.book_id) {
            Some(name) => format!("{} {}:{}", name, self.chapter, self.verse),
            None => format!("Book {} {}:{}", self.book_id, self.chapter, self.verse),
        }
    }
}

/// Verses in the longest chapter (Psalm 119); no real span is longer
pub const MAX_CHAPTER_VERSES: u32 = 176;

/// Every verse of a corpus, for index building
pub trait VerseSource {
    fn all_verses(&self) -> VerseResult<Vec<CorpusVerse>>;
}

/// Looks up the text of displayed verses
pub trait VerseTextLookup: Send {
    fn verse_text(&self, book: &str, chapter: u32, verse: u32) -> VerseResult<Option<String>>;

    /// Text of `start..=end` joined by spaces. Missing verses are skipped;
    /// None when none of them exist. At most one chapter's worth of verses
    /// is looked up.
    fn span_text(&self, book: &str, chapter: u32, start: u32, end: u32) -> VerseResult<Option<String>> {
        let end = end.min(start.saturating_add(MAX_CHAPTER_VERSES - 1));
        let mut parts = Vec::new();
        for verse in start..=end {
            if let Some(text) = self.verse_text(book, chapter, verse)? {
                parts.push(text);
            }
        }
        Ok(if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        })
    }
}

pub struct BibleDb {
    db_path: PathBuf,
}

impl BibleDb {
    /// Open an existing corpus database
    pub fn open(db_path: impl Into<PathBuf>) -> VerseResult<Self> {
        let db_path = db_path.into();
        if !db_path.exists() {
            return Err(VerseError::Corpus(format!(
                "bible database not found at {:?}",
                db_path
            )));
        }
        let db = Self { db_path };
        info!("📖 Bible database: {:?} ({} verses)", db.db_path, db.count()?);
        Ok(db)
    }

    /// Create the `bible` table if missing
    pub fn create(db_path: impl Into<PathBuf>) -> VerseResult<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS bible (
                Book INTEGER NOT NULL,
                Chapter INTEGER NOT NULL,
                Versecount INTEGER NOT NULL,
                verse TEXT NOT NULL,
                PRIMARY KEY (Book, Chapter, Versecount)
            )",
            [],
        )?;
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn insert_verses(&self, verses: &[CorpusVerse]) -> VerseResult<()> {
        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO bible (Book, Chapter, Versecount, verse) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for v in verses {
                stmt.execute(params![v.book_id as i64, v.chapter, v.verse, v.text])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn count(&self) -> VerseResult<usize> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM bible", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Verses of one chapter in verse order
    pub fn chapter(&self, book_id: usize, chapter: u32) -> VerseResult<Vec<CorpusVerse>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT Versecount, verse FROM bible WHERE Book = ? AND Chapter = ? ORDER BY Versecount",
        )?;
        let rows = stmt.query_map(params![book_id as i64, chapter], |row| {
            Ok(CorpusVerse {
                book_id,
                chapter,
                verse: row.get(0)?,
                text: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

impl VerseSource for BibleDb {
    fn all_verses(&self) -> VerseResult<Vec<CorpusVerse>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT Book, Chapter, Versecount, verse FROM bible ORDER BY Book, Chapter, Versecount",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CorpusVerse {
                book_id: row.get::<_, i64>(0)? as usize,
                chapter: row.get(1)?,
                verse: row.get(2)?,
                text: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

impl VerseTextLookup for BibleDb {
    fn verse_text(&self, book: &str, chapter: u32, verse: u32) -> VerseResult<Option<String>> {
        let Some(id) = book_id(book) else {
            debug!("📖 Unknown book for lookup: {}", book);
            return Ok(None);
        };
        let conn = Connection::open(&self.db_path)?;
        let text = conn
            .query_row(
                "SELECT verse FROM bible WHERE Book = ? AND Chapter = ? AND Versecount = ?",
                params![id as i64, chapter, verse],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(text)
    }

    /// One query for the whole chapter instead of one per verse
    fn span_text(&self, book: &str, chapter: u32, start: u32, end: u32) -> VerseResult<Option<String>> {
        let Some(id) = book_id(book) else {
            debug!("📖 Unknown book for lookup: {}", book);
            return Ok(None);
        };
        let parts: Vec<String> = self
            .chapter(id, chapter)?
            .into_iter()
            .filter(|v| (start..=end).contains(&v.verse))
            .map(|v| v.text)
            .collect();
        Ok(if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        })
    }
}

/// Corpus held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryBible {
    verses: BTreeMap<(usize, u32, u32), String>,
}

impl InMemoryBible {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, book_id: usize, chapter: u32, verse: u32, text: impl Into<String>) {
        self.verses.insert((book_id, chapter, verse), text.into());
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

impl FromIterator<CorpusVerse> for InMemoryBible {
    fn from_iter<I: IntoIterator<Item = CorpusVerse>>(iter: I) -> Self {
        let mut bible = Self::new();
        for v in iter {
            bible.insert(v.book_id, v.chapter, v.verse, v.text);
        }
        bible
    }
}

impl VerseSource for InMemoryBible {
    fn all_verses(&self) -> VerseResult<Vec<CorpusVerse>> {
        Ok(self
            .verses
            .iter()
            .map(|(&(book_id, chapter, verse), text)| CorpusVerse::new(book_id, chapter, verse, text.clone()))
            .collect())
    }
}

impl VerseTextLookup for InMemoryBible {
    fn verse_text(&self, book: &str, chapter: u32, verse: u32) -> VerseResult<Option<String>> {
        Ok(book_id(book).and_then(|id| self.verses.get(&(id, chapter, verse)).cloned()))
    }
}
