//! Pipeline Processor
//!
//! The single dispatch point between the transcript source and the session.
//! Owns the session, the duplicate gate and the quote matcher, so each has
//! exactly one writer.
//!
//! **Routing for a finalized chunk:**
//! 1. Explicit reference → confidence threshold → duplicate gate → session
//! 2. Navigation command → session
//! 3. Quoted verse → delayed fallback, dropped if an explicit reference
//!    arrives before it fires

use serde::{Deserialize, Serialize};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::{book_name, DetectionEvent, ReferenceExtractor};
use crate::corpus::VerseTextLookup;
use crate::gate::{meets_confidence, DebounceGate};
use crate::quote::{MatchResult, QuoteMatcher};
use crate::session::{DisplayPayload, ReferenceInput, ScriptureSession, SessionSnapshot};

/// Confidence assigned to pattern-matched references
pub const EXTRACTOR_CONFIDENCE: f32 = 0.95;

/// Input to the pipeline
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum PipelineEvent {
    /// Speech-to-text output; partial chunks only feed the trackers
    Transcript { text: String, is_final: bool },
    /// Reference resolved by an upstream detector
    Detection(DetectionEvent),
    /// Operator navigation phrase
    Command(String),
    Reset,
}

/// What the pipeline did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// Partial transcript, trackers updated only
    Partial,
    /// Handled as a navigation command
    Command,
    /// Reference passed both gates and reached the session
    Reference(String),
    /// Same reference inside the debounce window
    Duplicate(String),
    /// Below the confidence threshold
    LowConfidence(f32),
    /// Quote fallback armed
    QuoteScheduled(String),
    /// Nothing recognized
    NoMatch,
    Reset,
}

/// A session payload with its verse text resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayUpdate {
    #[serde(flatten)]
    pub payload: DisplayPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

struct PendingQuote {
    due: Instant,
    quote: MatchResult,
}

pub struct Processor {
    extractor: ReferenceExtractor,
    session: ScriptureSession,
    gate: DebounceGate,
    quotes: QuoteMatcher,
    lookup: Option<Box<dyn VerseTextLookup>>,

    confidence_threshold: f32,
    quote_delay: Duration,
    pending_quote: Option<PendingQuote>,

    emitted: std_mpsc::Receiver<DisplayPayload>,
    ready: Vec<DisplayUpdate>,
}

impl Processor {
    pub fn new(config: &Config, extractor: ReferenceExtractor, quotes: QuoteMatcher) -> Self {
        let (tx, emitted) = std_mpsc::channel();
        let session = ScriptureSession::new(
            config.session_config(),
            Box::new(move |payload: DisplayPayload| {
                let _ = tx.send(payload);
            }),
        );

        Self {
            extractor,
            session,
            gate: DebounceGate::new(config.reference_debounce()),
            quotes,
            lookup: None,
            confidence_threshold: config.confidence_threshold,
            quote_delay: config.quote_fallback_delay(),
            pending_quote: None,
            emitted,
            ready: Vec::new(),
        }
    }

    /// Resolve verse text for every emitted payload
    pub fn with_text_lookup(mut self, lookup: Box<dyn VerseTextLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn session_state(&self) -> SessionSnapshot {
        self.session.get_state()
    }

    pub fn quote_buffer(&self) -> Vec<String> {
        self.quotes.buffer_state()
    }

    pub fn has_pending_quote(&self) -> bool {
        self.pending_quote.is_some()
    }

    /// Handle one event
    pub fn handle(&mut self, event: PipelineEvent) -> ProcessResult {
        let result = match event {
            PipelineEvent::Transcript { text, is_final } => self.on_transcript(&text, is_final),
            PipelineEvent::Detection(detection) => self.on_detection(detection),
            PipelineEvent::Command(text) => {
                if self.session.on_command(&text) {
                    self.pending_quote = None;
                    ProcessResult::Command
                } else {
                    ProcessResult::NoMatch
                }
            }
            PipelineEvent::Reset => {
                info!("🔄 Pipeline reset");
                self.session.reset();
                self.gate.reset();
                self.pending_quote = None;
                ProcessResult::Reset
            }
        };
        self.collect_emitted();
        result
    }

    fn on_transcript(&mut self, text: &str, is_final: bool) -> ProcessResult {
        debug!("📝 {}: {}", if is_final { "Final" } else { "Partial" }, text);

        self.session.process_transcript(text);
        self.quotes.update_rolling_words(text);

        if !is_final {
            return ProcessResult::Partial;
        }

        // A full reference beats a navigation phrase in the same chunk
        // ("john three verse sixteen" is not a jump to verse 16)
        let found = self.extractor.find(text);
        if let Ok((reference, range_end)) = &found {
            if reference.is_valid() {
                return self.on_detection(DetectionEvent {
                    reference: reference.clone(),
                    range_end: *range_end,
                    confidence: EXTRACTOR_CONFIDENCE,
                });
            }
        }

        if self.session.on_command(text) {
            self.pending_quote = None;
            return ProcessResult::Command;
        }

        match found {
            Ok((reference, _)) => debug!("⏭️ Not a canonical reference: {}", reference),
            Err(reason) => self.extractor.record_miss(text, reason),
        }

        match self.quotes.try_detect_quote() {
            Some(quote) => {
                let reference = quote.reference.clone();
                debug!(
                    "📜 Quote fallback in {}ms: {}",
                    self.quote_delay.as_millis(),
                    reference
                );
                self.pending_quote = Some(PendingQuote {
                    due: Instant::now() + self.quote_delay,
                    quote,
                });
                ProcessResult::QuoteScheduled(reference)
            }
            None => ProcessResult::NoMatch,
        }
    }

    fn on_detection(&mut self, detection: DetectionEvent) -> ProcessResult {
        let key = detection.reference.gate_key();

        if !detection.reference.is_valid() {
            debug!("⏭️ Not a canonical reference: {}", detection.reference);
            return ProcessResult::NoMatch;
        }

        if !meets_confidence(detection.confidence, self.confidence_threshold) {
            debug!("⏭️ Low confidence: {} ({:.2})", key, detection.confidence);
            return ProcessResult::LowConfidence(detection.confidence);
        }

        // An explicit reference always beats a pending quote
        if self.pending_quote.take().is_some() {
            debug!("📜❌ Quote fallback dropped for {}", key);
        }

        if !self.gate.should_emit(&key) {
            return ProcessResult::Duplicate(key);
        }

        info!(
            "🎯 Detected: {} (confidence: {:.2})",
            detection.reference, detection.confidence
        );
        self.session
            .on_reference_detected(ReferenceInput::from(&detection));
        ProcessResult::Reference(key)
    }

    /// Earliest pending deadline across the session and the quote fallback
    pub fn next_deadline(&self) -> Option<Instant> {
        let quote = self.pending_quote.as_ref().map(|p| p.due);
        match (self.session.next_deadline(), quote) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run whatever is due
    pub fn fire_due(&mut self) {
        let now = Instant::now();

        if self.pending_quote.as_ref().is_some_and(|p| p.due <= now) {
            if let Some(PendingQuote { quote, .. }) = self.pending_quote.take() {
                match book_name(quote.book_id) {
                    Some(book) => {
                        info!("📜 Quote match: {}", quote.reference);
                        self.session.on_reference_detected(ReferenceInput::verse(
                            book,
                            quote.chapter,
                            quote.verse,
                        ));
                    }
                    None => warn!("⚠️ Quote with unknown book id {}", quote.book_id),
                }
            }
        }

        self.session.tick();
        self.collect_emitted();
    }

    fn collect_emitted(&mut self) {
        while let Ok(payload) = self.emitted.try_recv() {
            let text = self.lookup_text(&payload);
            if self.lookup.is_some() {
                self.session
                    .set_current_verse_text(text.as_deref().unwrap_or_default());
            }
            self.ready.push(DisplayUpdate { payload, text });
        }
    }

    fn lookup_text(&self, payload: &DisplayPayload) -> Option<String> {
        let lookup = self.lookup.as_ref()?;
        match lookup.span_text(
            &payload.book,
            payload.chapter,
            payload.verse_start,
            payload.verse_end,
        ) {
            Ok(text) => text,
            Err(e) => {
                warn!("❌ Verse lookup failed for {}: {}", payload, e);
                None
            }
        }
    }

    /// Drain updates produced since the last call
    pub fn take_updates(&mut self) -> Vec<DisplayUpdate> {
        std::mem::take(&mut self.ready)
    }

    /// Drive the pipeline until the event channel closes
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<PipelineEvent>,
        updates: mpsc::Sender<DisplayUpdate>,
    ) {
        info!("🚀 Pipeline running");

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        // A deadline that passed before this event fires first
                        self.fire_due();
                        self.handle(event);
                    }
                    None => break,
                },
                _ = wait_until(deadline) => self.fire_due(),
            }

            for update in self.take_updates() {
                if updates.send(update).await.is_err() {
                    warn!("⚠️ Display receiver dropped, stopping pipeline");
                    return;
                }
            }
        }

        info!("👋 Pipeline stopped");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
