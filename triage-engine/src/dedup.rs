// triage-engine/src/dedup.rs
// Ticket-storm detection via a sliding-window cosine-similarity filter

use crate::embed::{cosine, Embedder};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Verdict for one incoming ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormVerdict {
    /// Unique enough; alerting proceeds as usual
    Normal,
    /// This submission pushed a cluster across the storm threshold; it
    /// carries the one master-incident alert
    Master,
    /// Storm already declared; the individual alert is silenced
    Suppress,
}

/// Storm detector tuning
#[derive(Debug, Clone, Copy)]
pub struct StormConfig {
    /// Cosine similarity above which two tickets count as near-duplicates
    pub similarity: f32,
    /// Sliding window length
    pub window: Duration,
    /// Similar-ticket count at which the master incident fires
    pub threshold: usize,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            similarity: 0.9,
            window: Duration::from_secs(300),
            threshold: 10,
        }
    }
}

struct RecentTicket {
    arrival: Instant,
    text: String,
    embedding: Vec<f32>,
}

/// Sliding-window semantic deduplicator. The window is guarded by one mutex;
/// records older than the window are evicted before any verdict is emitted.
pub struct StormDetector {
    config: StormConfig,
    embedder: Arc<dyn Embedder>,
    window: Mutex<VecDeque<RecentTicket>>,
}

impl StormDetector {
    pub fn new(embedder: Arc<dyn Embedder>, config: StormConfig) -> Self {
        Self {
            config,
            embedder,
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Classify `text` against the recent window and record it
    pub fn check(&self, text: &str) -> StormVerdict {
        self.check_at(Instant::now(), text)
    }

    fn check_at(&self, now: Instant, text: &str) -> StormVerdict {
        let embedding = self.embedder.embed(text);
        let mut window = self.window.lock();

        while let Some(oldest) = window.front() {
            if now.duration_since(oldest.arrival) < self.config.window {
                break;
            }
            trace!(text = %oldest.text, "Evicting expired storm-window record");
            window.pop_front();
        }

        // The incoming ticket is counted against the window only, never
        // against itself
        let similar = window
            .iter()
            .filter(|record| cosine(&embedding, &record.embedding) > self.config.similarity)
            .count();

        window.push_back(RecentTicket {
            arrival: now,
            text: text.to_string(),
            embedding,
        });

        if similar == self.config.threshold {
            StormVerdict::Master
        } else if similar > self.config.threshold {
            StormVerdict::Suppress
        } else {
            StormVerdict::Normal
        }
    }

    /// Number of records currently retained
    pub fn window_len(&self) -> usize {
        self.window.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbedder;

    fn detector(threshold: usize) -> StormDetector {
        StormDetector::new(
            Arc::new(HashEmbedder::new(256)),
            StormConfig {
                similarity: 0.9,
                window: Duration::from_secs(300),
                threshold,
            },
        )
    }

    #[test]
    fn verdict_sequence_normal_master_suppress() {
        let detector = detector(3);
        let text = "the checkout page crashes when I click pay";

        for _ in 0..3 {
            assert_eq!(detector.check(text), StormVerdict::Normal);
        }
        assert_eq!(detector.check(text), StormVerdict::Master);
        assert_eq!(detector.check(text), StormVerdict::Suppress);
        assert_eq!(detector.check(text), StormVerdict::Suppress);
    }

    #[test]
    fn master_fires_exactly_once_per_cluster() {
        let detector = detector(3);
        let text = "payment gateway timeout on every order";
        let verdicts: Vec<StormVerdict> = (0..8).map(|_| detector.check(text)).collect();
        let masters = verdicts
            .iter()
            .filter(|v| **v == StormVerdict::Master)
            .count();
        assert_eq!(masters, 1);
    }

    #[test]
    fn dissimilar_tickets_stay_normal() {
        let detector = detector(2);
        assert_eq!(
            detector.check("refund for my annual subscription please"),
            StormVerdict::Normal
        );
        assert_eq!(
            detector.check("the mobile app crashes on startup"),
            StormVerdict::Normal
        );
        assert_eq!(
            detector.check("gdpr data deletion request"),
            StormVerdict::Normal
        );
    }

    #[test]
    fn expired_records_are_evicted() {
        let detector = detector(1);
        let text = "identical storm ticket";
        let start = Instant::now();

        assert_eq!(detector.check_at(start, text), StormVerdict::Normal);
        assert_eq!(detector.check_at(start, text), StormVerdict::Master);
        assert_eq!(detector.window_len(), 2);

        // past the window the cluster resets
        let later = start + Duration::from_secs(301);
        assert_eq!(detector.check_at(later, text), StormVerdict::Normal);
        assert_eq!(detector.window_len(), 1);
    }

    #[test]
    fn record_exactly_at_window_edge_is_evicted() {
        let detector = detector(1);
        let start = Instant::now();
        detector.check_at(start, "edge case ticket");
        detector.check_at(start + Duration::from_secs(300), "edge case ticket");
        assert_eq!(detector.window_len(), 1);
    }
}
