use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::quote::QuoteConfig;
use crate::session::SessionConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Gating
    pub confidence_threshold: f32,
    pub reference_debounce_ms: u64,

    // Session
    pub chapter_wait_ms: u64,
    pub command_debounce_ms: u64,
    pub chunk_size: u32,

    // Quote detection
    pub quote_window: usize,
    pub quote_min_matches: usize,
    pub rolling_buffer_words: usize,
    pub quote_debounce_ms: u64,
    pub quote_fallback_delay_ms: u64,

    // Data
    pub index_dir: String,
    pub bible_db_path: String,
    pub alias_miss_log: String,

    // Meta
    pub log_level: String,

    /// Extra aliases keyed by canonical book name, merged into the built-in table
    pub custom_aliases: HashMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.85,
            reference_debounce_ms: 5000,
            chapter_wait_ms: 3000,
            command_debounce_ms: 800,
            chunk_size: 3,
            quote_window: 7,
            quote_min_matches: 6,
            rolling_buffer_words: 30,
            quote_debounce_ms: 1500,
            quote_fallback_delay_ms: 200,
            index_dir: data_dir().join("index").to_string_lossy().to_string(),
            bible_db_path: data_dir().join("bible.db").to_string_lossy().to_string(),
            alias_miss_log: data_dir()
                .join("logs/alias_misses.log")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
            custom_aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from file, or fall back to defaults
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            match serde_json::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(&config_path, &backup_path);
                    Ok(Self::default())
                }
            }
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn reference_debounce(&self) -> Duration {
        Duration::from_millis(self.reference_debounce_ms)
    }

    pub fn quote_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.quote_fallback_delay_ms)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            chapter_wait: Duration::from_millis(self.chapter_wait_ms),
            command_debounce: Duration::from_millis(self.command_debounce_ms),
            chunk_size: self.chunk_size,
        }
    }

    pub fn quote_config(&self) -> QuoteConfig {
        QuoteConfig {
            window: self.quote_window,
            min_matches: self.quote_min_matches,
            buffer_words: self.rolling_buffer_words,
            debounce: Duration::from_millis(self.quote_debounce_ms),
        }
    }
}

/// `$VERSECUE_CONFIG` if set, otherwise `<config_dir>/versecue/config.json`
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("VERSECUE_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("versecue")
        .join("config.json")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("versecue")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.confidence_threshold, 0.85);
        assert_eq!(config.reference_debounce_ms, 5000);
        assert_eq!(config.chapter_wait_ms, 3000);
        assert_eq!(config.command_debounce_ms, 800);
        assert_eq!(config.quote_window, 7);
        assert_eq!(config.quote_min_matches, 6);
        assert!(config.custom_aliases.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config
            .custom_aliases
            .insert("John".to_string(), vec!["jahn".to_string()]);
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.index_dir, restored.index_dir);
        assert_eq!(restored.custom_aliases["John"], vec!["jahn".to_string()]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let restored: Config =
            serde_json::from_str(r#"{"chapter_wait_ms": 1000}"#).expect("Failed to deserialize");
        assert_eq!(restored.chapter_wait_ms, 1000);
        assert_eq!(restored.command_debounce_ms, 800);
        assert_eq!(
            restored.session_config().chapter_wait,
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_config_corrupt_json_handling() {
        let corrupt_json = "{ not valid json";
        let result: Result<Config, _> = serde_json::from_str(corrupt_json);
        assert!(result.is_err());
    }
}
