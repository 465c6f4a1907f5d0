//! Utility modules

pub mod fuzzy;

pub use fuzzy::{nearest_book, FuzzyMatch};
