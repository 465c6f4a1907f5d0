//! Text Normalization
//!
//! Turns raw spoken transcript fragments into a canonical token stream before
//! reference extraction: fillers removed, number words as digits, and book
//! aliases rewritten to the lowercase canonical name.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::debug;

use super::books::{AliasEntry, AliasTable};
use super::phonetic::soundex;

const ORDINALS: &[(&str, u32)] = &[("first", 1), ("second", 2), ("third", 3)];

const BASIC_NUMBERS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("won", 1),
    ("two", 2),
    ("to", 2),
    ("too", 2),
    ("three", 3),
    ("tree", 3),
    ("four", 4),
    ("for", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("ate", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, u32)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

const UNITS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

fn word_alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.collect::<Vec<_>>().join("|")
}

lazy_static! {
    static ref FILLER: Regex =
        Regex::new(r"\b(chapters|chapter|verses|verse|vers|vs|let us|turn to|read)\b")
            .expect("filler pattern");
    static ref ORDINAL_WORD: Regex = Regex::new(&format!(
        r"\b({})\b",
        word_alternation(ORDINALS.iter().map(|(w, _)| *w))
    ))
    .expect("ordinal pattern");
    static ref COMPOUND: Regex = Regex::new(&format!(
        r"\b({})\s+({})\b",
        word_alternation(TENS.iter().map(|(w, _)| *w)),
        word_alternation(UNITS.iter().copied())
    ))
    .expect("compound pattern");
    static ref SINGLE: Regex = Regex::new(&format!(
        r"\b({})\b",
        word_alternation(BASIC_NUMBERS.iter().chain(TENS.iter()).map(|(w, _)| *w))
    ))
    .expect("number pattern");
    static ref ORDINAL_SUFFIX: Regex = Regex::new(r"(\d+)(st|nd|rd|th)\b").expect("suffix pattern");
    static ref NUMBER_VALUES: HashMap<&'static str, u32> = ORDINALS
        .iter()
        .chain(BASIC_NUMBERS.iter())
        .chain(TENS.iter())
        .copied()
        .collect();
}

fn value_of(word: &str) -> u32 {
    NUMBER_VALUES.get(word).copied().unwrap_or_default()
}

/// Rewrite spoken numbers in lowercase text as digits.
///
/// Ordinal words go first ("first john" → "1 john"), then two-word
/// compounds ("twenty three" → "23") so single words can't split them,
/// then single number words, then ordinal suffixes ("3rd" → "3").
pub fn digitize_numbers(text: &str) -> String {
    let t = ORDINAL_WORD.replace_all(text, |caps: &Captures| value_of(&caps[1]).to_string());
    let t = COMPOUND.replace_all(&t, |caps: &Captures| {
        (value_of(&caps[1]) + value_of(&caps[2])).to_string()
    });
    let t = SINGLE.replace_all(&t, |caps: &Captures| value_of(&caps[1]).to_string());
    ORDINAL_SUFFIX.replace_all(&t, "$1").into_owned()
}

/// Byte offset of `needle` in `haystack` where it stands as whole words
pub fn find_phrase(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Normalizes spoken text for reference extraction
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    aliases: AliasTable,
}

impl TextNormalizer {
    /// Create a new text normalizer over an alias table
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Normalize a transcript fragment
    pub fn normalize(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let without_filler = FILLER.replace_all(&lower, " ");
        let digits = digitize_numbers(&without_filler);
        let books = self.normalize_books(&digits);

        books.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Rewrite the leftmost book alias to its canonical lowercase name.
    ///
    /// Among aliases starting at the same word the longest wins, so
    /// "2 kings 1" is never read as "2" + "kings 1". Exact (whole-word)
    /// aliases are tried across the whole text first; the phonetic pass only
    /// runs when none of them is present.
    fn normalize_books(&self, text: &str) -> String {
        let mut best: Option<(usize, &AliasEntry)> = None;
        // Entries are longest first, so a strictly smaller position is needed to replace
        for entry in self.aliases.entries() {
            if let Some(pos) = find_phrase(text, &entry.alias) {
                if best.map_or(true, |(p, _)| pos < p) {
                    best = Some((pos, entry));
                }
            }
        }

        if let Some((pos, entry)) = best {
            debug!("📚 Alias '{}' -> {}", entry.alias, entry.book);
            return format!(
                "{}{}{}",
                &text[..pos],
                entry.book.to_lowercase(),
                &text[pos + entry.alias.len()..]
            );
        }

        let mut words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        for i in 0..words.len() {
            if words[i].chars().count() < 3 {
                continue;
            }
            let Some(code) = soundex(&words[i]) else {
                continue;
            };
            let hit = self
                .aliases
                .entries()
                .iter()
                .find(|e| e.code.as_deref() == Some(code.as_str()));
            if let Some(entry) = hit {
                debug!(
                    "🔤 Phonetic match '{}' ~ '{}' ({}) -> {}",
                    words[i], entry.alias, code, entry.book
                );
                words[i] = entry.book.to_lowercase();
                return words.join(" ");
            }
        }

        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(AliasTable::default())
    }

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalizer().normalize("JOHN three SIXTEEN"), "john 3 16");
    }

    #[test]
    fn test_compound_numbers_before_singles() {
        assert_eq!(digitize_numbers("twenty three"), "23");
        assert_eq!(digitize_numbers("ninety nine"), "99");
        assert_eq!(digitize_numbers("thirty"), "30");
        assert_eq!(digitize_numbers("one hundred"), "1 hundred");
        assert_eq!(
            normalizer().normalize("psalm twenty three verse four"),
            "psalms 23 4"
        );
    }

    #[test]
    fn test_homophones_and_suffixes() {
        assert_eq!(digitize_numbers("won too tree ate"), "1 2 3 8");
        assert_eq!(digitize_numbers("the 3rd and 21st"), "the 3 and 21");
        assert_eq!(digitize_numbers("fourteen"), "14");
    }

    #[test]
    fn test_fillers_removed() {
        assert_eq!(
            normalizer().normalize("Turn to Romans chapter eight verse twenty eight"),
            "romans 8 28"
        );
        assert_eq!(
            normalizer().normalize("look chapter one verse to"),
            "luke 1 2"
        );
    }

    #[test]
    fn test_ordinal_books() {
        assert_eq!(
            normalizer().normalize("first corinthians thirteen four"),
            "1 corinthians 13 4"
        );
        assert_eq!(
            normalizer().normalize("fast corinthians tree sixteen"),
            "1 corinthians 3 16"
        );
    }

    #[test]
    fn test_longer_alias_wins() {
        assert_eq!(
            normalizer().normalize("song of songs two"),
            "song of solomon 2"
        );
    }

    #[test]
    fn test_numbered_book_with_chapter_one() {
        let n = normalizer();
        assert_eq!(n.normalize("second kings one five"), "2 kings 1 5");
        assert_eq!(n.normalize("second samuel one four"), "2 samuel 1 4");
        assert_eq!(n.normalize("2 kings 1:5"), "2 kings 1:5");
        assert_eq!(n.normalize("first kings two three"), "1 kings 2 3");
    }

    #[test]
    fn test_leftmost_alias_wins() {
        // "look" (Luke) sorts ahead of "john" but is heard later
        assert_eq!(
            normalizer().normalize("john three sixteen look"),
            "john 3 16 look"
        );
    }

    #[test]
    fn test_aliases_are_whole_words() {
        // "ax" (Acts) must not fire inside "relax"
        assert_eq!(normalizer().normalize("just relax"), "just relax");
    }

    #[test]
    fn test_phonetic_fallback() {
        assert_eq!(
            normalizer().normalize("ephesions two eight"),
            "ephesians 2 8"
        );
    }

    #[test]
    fn test_find_phrase() {
        assert_eq!(find_phrase("go back now", "back"), Some(3));
        assert_eq!(find_phrase("background", "back"), None);
        assert_eq!(find_phrase("1 john 3", "john"), Some(2));
        assert_eq!(find_phrase("anything", ""), None);
    }
}
