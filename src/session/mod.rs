//! Scripture Session
//!
//! Owns the single "what is on screen" location and applies the transition
//! rules for books, chapters, verses and ranges, the chapter → verse 1
//! default, navigation commands and read-along auto-advance.
//!
//! The chapter default is a stored deadline rather than a spawned timer:
//! the dispatcher sleeps until [`ScriptureSession::next_deadline`] and then
//! calls [`ScriptureSession::tick`]. Cancelling is clearing the deadline, so
//! a cancel is always observed before the default can fire.

pub mod commands;
pub mod types;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::corpus::MAX_CHAPTER_VERSES;

pub use commands::NavCommand;
pub use types::{DisplayPayload, ReferenceInput, SessionConfig, SessionSnapshot};

/// Receives every payload the session emits
pub type DisplaySink = Box<dyn FnMut(DisplayPayload) + Send>;

/// Words of the shown verse's text kept for read-along matching
const TRACKED_TAIL_WORDS: usize = 3;

/// Lowercase, strip punctuation, split into words
fn verse_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub struct ScriptureSession {
    config: SessionConfig,
    emit: DisplaySink,

    book: Option<String>,
    chapter: Option<u32>,
    start_verse: Option<u32>,
    end_verse: Option<u32>,
    current_verse: Option<u32>,
    reading_mode: bool,

    /// Pending chapter → verse 1 default
    verse_deadline: Option<Instant>,
    last_command: Option<Instant>,

    /// Text of the verse on screen, for auto-advance
    tracked_words: Vec<String>,
}

impl ScriptureSession {
    pub fn new(config: SessionConfig, emit: DisplaySink) -> Self {
        Self {
            config,
            emit,
            book: None,
            chapter: None,
            start_verse: None,
            end_verse: None,
            current_verse: None,
            reading_mode: false,
            verse_deadline: None,
            last_command: None,
            tracked_words: Vec::new(),
        }
    }

    pub fn get_state(&self) -> SessionSnapshot {
        SessionSnapshot {
            book: self.book.clone(),
            chapter: self.chapter,
            start_verse: self.start_verse,
            end_verse: self.end_verse,
            current_verse: self.current_verse,
            is_range: self.start_verse != self.end_verse,
            can_advance: self.current_verse.is_some(),
            can_go_back: self.current_verse.is_some_and(|v| v > 1),
            reading_mode: self.reading_mode,
            awaiting_verse: self.verse_deadline.is_some(),
            tracked_words: self.tracked_words.len(),
        }
    }

    /// Clear everything, including any pending verse default
    pub fn reset(&mut self) {
        self.verse_deadline = None;
        self.book = None;
        self.chapter = None;
        self.start_verse = None;
        self.end_verse = None;
        self.current_verse = None;
        self.reading_mode = false;
        self.tracked_words.clear();
    }

    /// Cancel the pending "default to verse 1"
    pub fn cancel_verse_timer(&mut self) {
        if self.verse_deadline.take().is_some() {
            info!("⏱️❌ Verse timer cancelled (verse was detected)");
        }
    }

    /// When the pending verse default is due, if one is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.verse_deadline
    }

    /// Fire the verse default if its deadline has passed
    pub fn tick(&mut self) {
        let Some(deadline) = self.verse_deadline else {
            return;
        };
        if Instant::now() < deadline {
            return;
        }
        self.verse_deadline = None;

        if self.book.is_none() || self.chapter.is_none() {
            return;
        }

        info!(
            "⏱️ No verse after {}ms - defaulting to verse 1",
            self.config.chapter_wait.as_millis()
        );
        self.set_single(1);
        self.emit_single_verse(1);
    }

    fn arm_verse_default(&mut self) {
        self.verse_deadline = Some(Instant::now() + self.config.chapter_wait);
        info!(
            "📑 Chapter detected: {} {} (waiting {}ms for verse...)",
            self.book.as_deref().unwrap_or("?"),
            self.chapter.unwrap_or_default(),
            self.config.chapter_wait.as_millis()
        );
    }

    /// Apply a gated detection
    pub fn on_reference_detected(&mut self, input: ReferenceInput) {
        debug!("📥 Session received: {:?}", input);

        // Book alone is context only
        if input.book.is_some() && input.chapter.is_none() && input.verse.is_none() {
            info!(
                "📚 Book-only detected: {:?} - waiting for chapter/verse",
                input.book
            );
            self.book = input.book;
            return;
        }

        if input.chapter.is_none() && self.chapter.is_none() {
            debug!("⏭️ Ignored: No chapter context established");
            return;
        }

        // Bare verse numbers can't hijack an active reading
        if self.reading_mode && input.book.is_none() && input.verse.is_some() {
            info!("🔒 Reading Mode: Ignored bare verse {:?} update", input.verse);
            return;
        }

        if let Some(book) = &input.book {
            if self.book.as_ref() != Some(book) {
                self.reset();
                self.book = Some(book.clone());
            }
        }

        if let Some(chapter) = input.chapter {
            if self.chapter != Some(chapter) {
                self.chapter = Some(chapter);
                self.start_verse = None;
                self.end_verse = None;
                self.current_verse = None;
                self.reading_mode = false;

                match input.verse {
                    Some(verse) => debug!(
                        "⚡ Fast path: {} {}:{}",
                        self.book.as_deref().unwrap_or("?"),
                        chapter,
                        verse
                    ),
                    None => {
                        self.arm_verse_default();
                        return;
                    }
                }
            }
        }

        let Some(verse) = input.verse else {
            return;
        };

        match input.range_end {
            Some(end) if end > verse && end - verse >= MAX_CHAPTER_VERSES => {
                debug!("⏭️ Range {}-{} longer than any chapter, showing {}", verse, end, verse);
                self.verse_deadline = None;
                self.set_single(verse);
                self.emit_single_verse(verse);
            }
            Some(end) if end > verse => {
                self.verse_deadline = None;
                self.start_verse = Some(verse);
                self.end_verse = Some(end);
                self.current_verse = Some(verse);
                self.emit_range(verse, end);
            }
            _ => {
                self.verse_deadline = None;
                self.set_single(verse);
                self.emit_single_verse(verse);
            }
        }
    }

    /// Handle a navigation phrase; true when it was acted on
    pub fn on_command(&mut self, text: &str) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_command {
            if now.duration_since(last) < self.config.command_debounce {
                return false;
            }
        }

        match NavCommand::parse(text) {
            Some(NavCommand::Next) => {
                self.last_command = Some(now);
                self.reading_mode = false;
                self.advance();
                true
            }
            Some(NavCommand::Previous) => {
                self.last_command = Some(now);
                self.reading_mode = false;
                self.go_back();
                true
            }
            Some(NavCommand::JumpTo(verse)) => {
                self.last_command = Some(now);
                if self.book.is_none() || self.chapter.is_none() {
                    return false;
                }
                self.reading_mode = false;
                self.jump_to_verse(verse);
                true
            }
            None => false,
        }
    }

    fn advance(&mut self) {
        if self.book.is_none() || self.chapter.is_none() {
            return;
        }
        let Some(current) = self.current_verse else {
            return;
        };

        let Some(next) = current.checked_add(1) else {
            return;
        };
        self.set_single(next);
        info!("⏭️ Advancing to verse {}", next);
        self.emit_single_verse(next);
    }

    fn go_back(&mut self) {
        if self.book.is_none() || self.chapter.is_none() {
            return;
        }
        let Some(current) = self.current_verse else {
            return;
        };
        if current <= 1 {
            return;
        }

        let previous = current - 1;
        self.set_single(previous);
        info!("⏮️ Going back to verse {}", previous);
        self.emit_single_verse(previous);
    }

    fn jump_to_verse(&mut self, verse: u32) {
        if verse == 0 {
            return;
        }
        self.verse_deadline = None;
        self.set_single(verse);
        self.emit_single_verse(verse);
    }

    /// Track the text of the verse now on screen
    pub fn set_current_verse_text(&mut self, text: &str) {
        self.tracked_words = verse_words(text);
        debug!(
            "📝 Tracking verse text: \"{}...\" ({} words)",
            self.tracked_words
                .iter()
                .take(5)
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            self.tracked_words.len()
        );
    }

    /// Advance once when the transcript reaches the end of the tracked verse
    pub fn process_transcript(&mut self, text: &str) {
        if !self.reading_mode || self.tracked_words.is_empty() {
            return;
        }

        let tail_start = self.tracked_words.len().saturating_sub(TRACKED_TAIL_WORDS);
        let tail = self.tracked_words[tail_start..].join(" ");
        let heard = verse_words(text).join(" ");

        if heard.contains(&tail) {
            info!("✨ Auto-Advance: Matched end of verse!");
            self.advance();
            self.tracked_words.clear();
        }
    }

    fn set_single(&mut self, verse: u32) {
        self.start_verse = Some(verse);
        self.end_verse = Some(verse);
        self.current_verse = Some(verse);
    }

    fn emit_single_verse(&mut self, verse: u32) {
        self.emit_span(verse, verse);
    }

    fn emit_range(&mut self, start: u32, end: u32) {
        self.emit_span(start, end);
    }

    fn emit_span(&mut self, start: u32, end: u32) {
        let (Some(book), Some(chapter)) = (self.book.clone(), self.chapter) else {
            return;
        };

        self.reading_mode = true;

        let payload = DisplayPayload {
            book,
            chapter,
            verse_start: start,
            verse_end: end,
            is_preview: true,
            range_end: self.end_verse,
            chunk_size: self.config.chunk_size,
        };
        info!("📖 Preview: {}", payload);
        (self.emit)(payload);
    }
}
