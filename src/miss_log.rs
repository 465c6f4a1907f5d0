//! Alias-miss logging
//!
//! Records transcript fragments the extractor could not resolve, so the
//! alias table can be tuned from real mishearings.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, error};

use crate::error::VerseResult;
use crate::utils::nearest_book;

/// Fire-and-forget sink for unresolved extraction attempts
pub trait AliasMissSink: Send + Sync {
    fn record(&self, raw: &str, reason: &str);
}

/// A recorded miss
#[derive(Debug, Clone, PartialEq)]
pub struct MissRecord {
    pub raw: String,
    pub reason: String,
}

/// Appends misses to a plain-text log file
pub struct FileMissLog {
    path: PathBuf,
}

impl FileMissLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn append(&self, raw: &str, reason: &str) -> VerseResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let hint = nearest_book(raw)
            .map(|m| format!(" | Nearest: {} ({:.2})", m.value, m.score))
            .unwrap_or_default();

        writeln!(
            file,
            "[{}] \"{}\" | Context: {}{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            raw,
            reason,
            hint
        )?;
        Ok(())
    }
}

impl AliasMissSink for FileMissLog {
    fn record(&self, raw: &str, reason: &str) {
        if let Err(e) = self.append(raw, reason) {
            error!("❌ Failed to log alias miss: {}", e);
        }
    }
}

/// Keeps misses in memory
#[derive(Default)]
pub struct MemoryMissLog {
    entries: Mutex<Vec<MissRecord>>,
}

impl MemoryMissLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> VerseResult<Vec<MissRecord>> {
        Ok(self.entries.lock()?.clone())
    }
}

impl AliasMissSink for MemoryMissLog {
    fn record(&self, raw: &str, reason: &str) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(MissRecord {
                raw: raw.to_string(),
                reason: reason.to_string(),
            }),
            Err(e) => debug!("Miss log lock poisoned: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_miss_log_appends() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let log = FileMissLog::new(dir.path().join("logs/alias_misses.log"));

        log.record("jaunt three sixteen", "No book detected");
        log.record("good morning", "No book detected");

        let content = std::fs::read_to_string(log.path()).expect("Failed to read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"jaunt three sixteen\" | Context: No book detected"));
        assert!(lines[1].contains("\"good morning\""));
    }

    #[test]
    fn test_memory_miss_log() {
        let log = MemoryMissLog::new();
        log.record("hello", "No book detected");
        let entries = log.entries().unwrap();
        assert_eq!(
            entries,
            vec![MissRecord {
                raw: "hello".to_string(),
                reason: "No book detected".to_string()
            }]
        );
    }
}
