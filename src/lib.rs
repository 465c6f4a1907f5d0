//! VerseCue Library
//!
//! Turns live sermon transcripts into projection cues: spoken references
//! ("john three sixteen"), navigation phrases ("next verse") and quoted
//! verse text all resolve to a single on-screen verse or range.

pub mod config;
pub mod core;
pub mod corpus;
pub mod error;
pub mod gate;
pub mod miss_log;
pub mod processor;
pub mod quote;
pub mod session;
pub mod utils;
