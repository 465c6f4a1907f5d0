//! Debounce & Confidence Gate
//!
//! Suppresses re-emission of the same reference inside a short window.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default window between emissions of the same reference
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(5000);

/// Default minimum detection confidence
pub const MIN_CONFIDENCE: f32 = 0.85;

/// Whether a detection is confident enough to act on
pub fn meets_confidence(confidence: f32, threshold: f32) -> bool {
    confidence >= threshold
}

/// Remembers the last emitted reference and when it was emitted
#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// False for a repeat of the stored reference inside the window;
    /// otherwise stores `reference` with the current time and returns true
    pub fn should_emit(&mut self, reference: &str) -> bool {
        let now = Instant::now();

        if let Some((last_ref, last_time)) = &self.last {
            if last_ref == reference && now.duration_since(*last_time) < self.window {
                debug!("⏭️ Debounced duplicate: {}", reference);
                return false;
            }
        }

        self.last = Some((reference.to_string(), now));
        true
    }

    /// Clear stored state
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_within_window() {
        let mut gate = DebounceGate::default();
        assert!(gate.should_emit("John 3:16"));

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert!(!gate.should_emit("John 3:16"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(gate.should_emit("John 3:16"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_reference_passes() {
        let mut gate = DebounceGate::default();
        assert!(gate.should_emit("John 3:16"));
        assert!(gate.should_emit("John 3:17"));
        // Last stored is now 3:17
        assert!(gate.should_emit("John 3:16"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_window() {
        let mut gate = DebounceGate::default();
        gate.should_emit("Romans 8:28");
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(!gate.should_emit("Romans 8:28"));

        gate.reset();
        assert!(gate.should_emit("Romans 8:28"));
    }

    #[test]
    fn test_confidence_threshold() {
        assert!(meets_confidence(0.85, MIN_CONFIDENCE));
        assert!(meets_confidence(0.99, MIN_CONFIDENCE));
        assert!(!meets_confidence(0.84, MIN_CONFIDENCE));
    }
}
