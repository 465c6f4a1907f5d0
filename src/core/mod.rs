//! Core reference resolution
//!
//! Book canon and aliases, phonetic codes, text normalization and
//! pattern-based reference extraction.

pub mod books;
pub mod extractor;
pub mod phonetic;
pub mod text_normalizer;

pub use books::{book_id, book_name, canonical_book, AliasTable, BOOKS};
pub use extractor::{CanonicalReference, DetectionEvent, ReferenceExtractor};
pub use text_normalizer::TextNormalizer;
