//! Navigation command phrases

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::text_normalizer::{digitize_numbers, find_phrase};

const NEXT_PHRASES: &[&str] = &[
    "next verse",
    "next",
    "continue",
    "go on",
    "keep going",
    "move on",
];

const PREVIOUS_PHRASES: &[&str] = &[
    "previous verse",
    "previous",
    "go back",
    "back",
    "last verse",
    "before",
];

lazy_static! {
    static ref VERSE_JUMP: Regex = Regex::new(r"\bverse\s+(\d+)\b").expect("verse jump pattern");
}

/// A spoken navigation command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
    JumpTo(u32),
}

impl NavCommand {
    /// Parse a transcript chunk. Next wins over previous, which wins over a jump.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.to_lowercase();

        if NEXT_PHRASES.iter().any(|p| find_phrase(&t, p).is_some()) {
            return Some(Self::Next);
        }
        if PREVIOUS_PHRASES.iter().any(|p| find_phrase(&t, p).is_some()) {
            return Some(Self::Previous);
        }

        let digits = digitize_numbers(&t);
        VERSE_JUMP
            .captures(&digits)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(Self::JumpTo)
    }
}
