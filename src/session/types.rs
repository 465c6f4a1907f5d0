use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::DetectionEvent;

/// Timing and display parameters for a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a bare chapter waits for a verse before defaulting to 1
    pub chapter_wait: Duration,
    /// Minimum gap between handled navigation commands
    pub command_debounce: Duration,
    /// Verses per display chunk, carried on every payload
    pub chunk_size: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chapter_wait: Duration::from_millis(3000),
            command_debounce: Duration::from_millis(800),
            chunk_size: 3,
        }
    }
}

/// Partial reference fed to the session; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInput {
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
    pub range_end: Option<u32>,
}

impl ReferenceInput {
    pub fn verse(book: &str, chapter: u32, verse: u32) -> Self {
        Self {
            book: Some(book.to_string()),
            chapter: Some(chapter),
            verse: Some(verse),
            range_end: None,
        }
    }

    pub fn chapter(book: &str, chapter: u32) -> Self {
        Self {
            book: Some(book.to_string()),
            chapter: Some(chapter),
            ..Default::default()
        }
    }
}

impl From<&DetectionEvent> for ReferenceInput {
    fn from(event: &DetectionEvent) -> Self {
        Self {
            book: Some(event.reference.book.clone()),
            chapter: Some(event.reference.chapter),
            verse: event.reference.verse,
            range_end: event.range_end,
        }
    }
}

/// What the session wants on screen. Never carries verse text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPayload {
    pub book: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
    pub is_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_end: Option<u32>,
    pub chunk_size: u32,
}

impl DisplayPayload {
    pub fn is_range(&self) -> bool {
        self.verse_end != self.verse_start
    }
}

impl std::fmt::Display for DisplayPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_range() {
            write!(
                f,
                "{} {}:{}-{}",
                self.book, self.chapter, self.verse_start, self.verse_end
            )
        } else {
            write!(f, "{} {}:{}", self.book, self.chapter, self.verse_start)
        }
    }
}

/// Read-only view of the session for UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub start_verse: Option<u32>,
    pub end_verse: Option<u32>,
    pub current_verse: Option<u32>,
    pub is_range: bool,
    pub can_advance: bool,
    pub can_go_back: bool,
    pub reading_mode: bool,
    pub awaiting_verse: bool,
    pub tracked_words: usize,
}
