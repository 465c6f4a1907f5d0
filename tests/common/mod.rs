use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::{env, fs};
use tempfile::TempDir;

use versecue::config::Config;
use versecue::core::{AliasTable, ReferenceExtractor, TextNormalizer};
use versecue::corpus::{BibleDb, CorpusVerse, InMemoryBible};
use versecue::miss_log::MemoryMissLog;
use versecue::processor::Processor;
use versecue::quote::{QuoteConfig, QuoteMatcher, VerseIndexBuilder};

/// A handful of real verses, enough for references, ranges and quotes
pub fn fixture_verses() -> Vec<CorpusVerse> {
    vec![
        CorpusVerse::new(0, 1, 1, "In the beginning God created the heaven and the earth."),
        CorpusVerse::new(
            42,
            3,
            16,
            "For God so loved the world, that he gave his only begotten Son, that whosoever \
             believeth in him should not perish, but have everlasting life.",
        ),
        CorpusVerse::new(
            42,
            3,
            17,
            "For God sent not his Son into the world to condemn the world; but that the world \
             through him might be saved.",
        ),
        CorpusVerse::new(
            42,
            3,
            18,
            "He that believeth on him is not condemned: but he that believeth not is condemned \
             already, because he hath not believed in the name of the only begotten Son of God.",
        ),
        CorpusVerse::new(42, 11, 35, "Jesus wept."),
        CorpusVerse::new(
            44,
            8,
            28,
            "And we know that all things work together for good to them that love God, to them \
             who are the called according to his purpose.",
        ),
    ]
}

pub fn fixture_bible() -> InMemoryBible {
    fixture_verses().into_iter().collect()
}

/// Processor over the fixture corpus with default config
pub fn fixture_processor() -> (Processor, Arc<MemoryMissLog>) {
    let misses = Arc::new(MemoryMissLog::new());
    let extractor = ReferenceExtractor::new(
        TextNormalizer::new(AliasTable::default()),
        misses.clone(),
    )
    .expect("Failed to build extractor");

    let mut builder = VerseIndexBuilder::new();
    for verse in fixture_verses() {
        builder.add(verse);
    }
    let quotes = QuoteMatcher::with_index(QuoteConfig::default(), builder.build());

    let processor = Processor::new(&Config::default(), extractor, quotes)
        .with_text_lookup(Box::new(fixture_bible()));
    (processor, misses)
}

/// Isolated config, corpus database and index directory for CLI runs
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub index_dir: PathBuf,
    pub miss_log: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config/versecue.json");
        let db_path = temp_dir.path().join("data/bible.db");
        let index_dir = temp_dir.path().join("data/index");
        let miss_log = temp_dir.path().join("data/alias_misses.log");

        let db = BibleDb::create(&db_path).expect("Failed to create bible db");
        db.insert_verses(&fixture_verses())
            .expect("Failed to insert fixture verses");

        let config = Config {
            bible_db_path: db_path.to_string_lossy().to_string(),
            index_dir: index_dir.to_string_lossy().to_string(),
            alias_miss_log: miss_log.to_string_lossy().to_string(),
            ..Config::default()
        };
        fs::create_dir_all(config_path.parent().expect("config parent"))
            .expect("Failed to create config dir");
        fs::write(
            &config_path,
            serde_json::to_string_pretty(&config).expect("Failed to encode config"),
        )
        .expect("Failed to write config");

        TestContext {
            temp_dir,
            config_path,
            db_path,
            index_dir,
            miss_log,
        }
    }

    /// Run the binary with `args`, feeding `stdin`, and wait for it to exit
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let bin_path = env!("CARGO_BIN_EXE_versecue");

        let mut child = Command::new(bin_path)
            .args(args)
            .env("VERSECUE_CONFIG", &self.config_path)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn versecue");

        {
            let mut pipe = child.stdin.take().expect("stdin");
            pipe.write_all(stdin.as_bytes())
                .expect("Failed to write stdin");
        }

        child.wait_with_output().expect("Failed to wait for versecue")
    }
}

/// Stdout split into parsed JSON lines
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line is not JSON"))
        .collect()
}
