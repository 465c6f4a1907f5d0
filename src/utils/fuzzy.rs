//! Fuzzy matching utilities
//!
//! Similarity scoring used to suggest which book an unresolved fragment
//! was probably aiming at.

use strsim::normalized_levenshtein;

use crate::core::books::BOOKS;

/// Minimum similarity for a nearest-book suggestion
const SUGGESTION_CUTOFF: f64 = 0.5;

/// Result of a fuzzy match with the matched value and score
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub value: String,
    pub score: f64,
}

/// Find matches in a list of candidates
///
/// Returns up to `n` matches with scores above `cutoff`, best first
fn find_matches(
    search_term: &str,
    candidates: &[&str],
    n: usize,
    cutoff: f64,
) -> Vec<FuzzyMatch> {
    let search_lower = search_term.to_lowercase();

    let mut matches: Vec<FuzzyMatch> = candidates
        .iter()
        .filter_map(|candidate| {
            let score = normalized_levenshtein(&search_lower, &candidate.to_lowercase());
            (score >= cutoff).then(|| FuzzyMatch {
                value: candidate.to_string(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(n);

    matches
}

/// Find the best match above a minimum score
fn find_best_match(search_term: &str, candidates: &[&str], cutoff: f64) -> Option<FuzzyMatch> {
    find_matches(search_term, candidates, 1, cutoff)
        .into_iter()
        .next()
}

/// Closest canonical book to any word or word pair in `text`
pub fn nearest_book(text: &str) -> Option<FuzzyMatch> {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();

    let mut spans: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    spans.extend(words.windows(2).map(|pair| pair.join(" ")));

    spans
        .iter()
        .filter(|span| span.len() >= 3)
        .filter_map(|span| find_best_match(span, &BOOKS, SUGGESTION_CUTOFF))
        .max_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
