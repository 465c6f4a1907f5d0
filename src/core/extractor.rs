//! Reference Extraction
//!
//! Pattern match over normalized text producing `{book, chapter, verse?}`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::books::BOOKS;
use super::text_normalizer::TextNormalizer;
use crate::error::VerseResult;
use crate::miss_log::AliasMissSink;

/// A resolved `{book, chapter, verse?}` triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalReference {
    pub book: String,
    pub chapter: u32,
    pub verse: Option<u32>,
}

impl CanonicalReference {
    /// Book in the canon, chapter ≥ 1, verse ≥ 1 when present
    pub fn is_valid(&self) -> bool {
        BOOKS.contains(&self.book.as_str()) && self.chapter >= 1 && self.verse.map_or(true, |v| v >= 1)
    }

    /// Key used for duplicate gating: `John 3:16`, or `John 3` without a verse
    pub fn gate_key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.verse {
            Some(v) => write!(f, "{} {}:{}", self.book, self.chapter, v),
            None => write!(f, "{} {}", self.book, self.chapter),
        }
    }
}

/// A reference detected in one transcript chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub reference: CanonicalReference,
    pub range_end: Option<u32>,
    /// 0.0 to 1.0
    pub confidence: f32,
}

/// Extracts scripture references from transcript text
pub struct ReferenceExtractor {
    normalizer: TextNormalizer,
    pattern: Regex,
    misses: Arc<dyn AliasMissSink>,
}

impl ReferenceExtractor {
    pub fn new(normalizer: TextNormalizer, misses: Arc<dyn AliasMissSink>) -> VerseResult<Self> {
        let mut names: Vec<String> = BOOKS.iter().map(|b| b.to_lowercase()).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        let books = names
            .iter()
            .map(|n| regex::escape(n).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        // [prefix] book chapter [sep verse [through end]]
        let pattern = Regex::new(&format!(
            r"(?i)\b((?:1|2|3)\s+)?({books})\s+(\d+)(?:\s*[:\s,]\s*(\d+)(?:\s*(?:-|through|thru|until)\s*(\d+))?)?"
        ))?;

        Ok(Self {
            normalizer,
            pattern,
            misses,
        })
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Extract a reference, logging a miss when nothing matches
    pub fn extract(&self, text: &str) -> Option<CanonicalReference> {
        self.extract_with_range(text).map(|(reference, _)| reference)
    }

    /// Extract a reference plus any spoken range end ("16 through 18")
    pub fn extract_with_range(&self, text: &str) -> Option<(CanonicalReference, Option<u32>)> {
        match self.find(text) {
            Ok(found) => Some(found),
            Err(reason) => {
                self.record_miss(text, reason);
                None
            }
        }
    }

    /// Report a chunk that held no reference
    pub fn record_miss(&self, text: &str, reason: &str) {
        self.misses.record(text, reason);
    }

    /// Match without reporting a miss; the error is the miss reason
    pub fn find(&self, text: &str) -> Result<(CanonicalReference, Option<u32>), &'static str> {
        let normalized = self.normalizer.normalize(text);

        let Some(caps) = self.pattern.captures(&normalized) else {
            debug!("🔍 No reference in '{}'", normalized);
            return Err("No book detected");
        };

        let prefix = caps.get(1).map(|m| m.as_str().trim());
        let book = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let full_book = match prefix {
            Some(p) => format!("{} {}", p, book),
            None => book.to_string(),
        };

        let Some(chapter) = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            return Err("Chapter out of range");
        };
        let verse = caps.get(4).and_then(|m| m.as_str().parse::<u32>().ok());
        let range_end = caps.get(5).and_then(|m| m.as_str().parse::<u32>().ok());

        // An unknown prefixed span ("3 mark") stays raw and fails canon checks
        let resolved = self
            .normalizer
            .aliases()
            .resolve(&full_book)
            .map(str::to_string)
            .unwrap_or(full_book);

        let reference = CanonicalReference {
            book: resolved,
            chapter,
            verse,
        };

        info!("📖 Extracted: {} from \"{}\"", reference, text);
        Ok((reference, range_end))
    }
}
