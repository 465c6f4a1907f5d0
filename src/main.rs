//! VerseCue - spoken scripture cueing
//!
//! Reads transcript lines on stdin and writes display updates as JSON
//! lines on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use versecue::config::Config;
use versecue::core::{AliasTable, ReferenceExtractor, TextNormalizer};
use versecue::corpus::BibleDb;
use versecue::miss_log::FileMissLog;
use versecue::processor::{PipelineEvent, Processor};
use versecue::quote::{QuoteMatcher, VerseIndexBuilder};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream transcript lines from stdin: `~text` is a partial chunk,
    /// `!reset` resets, `!cmd text` is an operator command
    Listen,
    /// Build the quote index artifacts from a bible database
    BuildIndex {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show how a phrase normalizes and what reference it yields
    Resolve {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn init_logging(verbose: bool, config: &Config) {
    let default = if verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_extractor(config: &Config) -> Result<ReferenceExtractor> {
    let aliases = AliasTable::with_custom(&config.custom_aliases);
    let misses = Arc::new(FileMissLog::new(&config.alias_miss_log));
    Ok(ReferenceExtractor::new(TextNormalizer::new(aliases), misses)?)
}

fn parse_line(line: &str) -> Option<PipelineEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line == "!reset" {
        return Some(PipelineEvent::Reset);
    }
    if let Some(cmd) = line.strip_prefix("!cmd ") {
        return Some(PipelineEvent::Command(cmd.to_string()));
    }
    if let Some(partial) = line.strip_prefix('~') {
        return Some(PipelineEvent::Transcript {
            text: partial.to_string(),
            is_final: false,
        });
    }
    Some(PipelineEvent::Transcript {
        text: line.to_string(),
        is_final: true,
    })
}

async fn listen(config: Config) -> Result<()> {
    let extractor = build_extractor(&config)?;

    let mut quotes = QuoteMatcher::new(config.quote_config());
    if !quotes.load_index(Path::new(&config.index_dir)) {
        warn!("📜 Quote detection disabled until the index is built");
    }

    let mut processor = Processor::new(&config, extractor, quotes);
    match BibleDb::open(&config.bible_db_path) {
        Ok(db) => processor = processor.with_text_lookup(Box::new(db)),
        Err(e) => warn!("📖 Verse text unavailable: {}", e),
    }

    let (event_tx, event_rx) = mpsc::channel(64);
    let (update_tx, mut update_rx) = mpsc::channel(64);
    let pipeline = tokio::spawn(processor.run(event_rx, update_tx));

    let printer = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            match serde_json::to_string(&update) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("❌ Failed to encode update: {}", e),
            }
        }
    });

    info!("✅ VerseCue ready - reading transcript from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(event) = parse_line(&line) {
            if event_tx.send(event).await.is_err() {
                break;
            }
        }
    }

    drop(event_tx);
    pipeline.await?;
    printer.await?;
    Ok(())
}

fn build_index(config: &Config, db: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let db_path = db.unwrap_or_else(|| PathBuf::from(&config.bible_db_path));
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.index_dir));

    info!("📖 Opening database: {:?}", db_path);
    let db = BibleDb::open(&db_path).context("opening bible database")?;
    let index = VerseIndexBuilder::from_source(&db)?.write(&out_dir)?;

    println!(
        "{}",
        serde_json::json!({
            "verses": index.len(),
            "firstWords": index.first_words().len(),
            "out": out_dir,
        })
    );
    Ok(())
}

fn resolve(config: &Config, text: &str) -> Result<()> {
    let extractor = build_extractor(config)?;
    let normalized = extractor.normalizer().normalize(text);
    let extracted = extractor.extract_with_range(text);

    let output = match extracted {
        Some((reference, range_end)) => serde_json::json!({
            "normalized": normalized,
            "reference": reference,
            "rangeEnd": range_end,
        }),
        None => serde_json::json!({
            "normalized": normalized,
            "reference": null,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    init_logging(args.verbose, &config);
    info!("📖 VerseCue v{} starting...", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Listen => listen(config).await,
        Command::BuildIndex { db, out } => build_index(&config, db, out),
        Command::Resolve { text } => resolve(&config, &text.join(" ")),
    }
}
