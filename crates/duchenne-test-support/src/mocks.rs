//! Mock collaborators for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use duchenne_core::Telemetry;

/// Telemetry sink that counts every event.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    requests: AtomicUsize,
    scored: AtomicUsize,
    rejected: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

/// Snapshot of [`RecordingTelemetry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryCounts {
    pub requests: usize,
    pub scored: usize,
    pub rejected: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl RecordingTelemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> TelemetryCounts {
        TelemetryCounts {
            requests: self.requests.load(Ordering::SeqCst),
            scored: self.scored.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
            cache_misses: self.cache_misses.load(Ordering::SeqCst),
        }
    }
}

impl Telemetry for RecordingTelemetry {
    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn record_faces(&self, scored: usize, rejected: usize) {
        self.scored.fetch_add(scored, Ordering::SeqCst);
        self.rejected.fetch_add(rejected, Ordering::SeqCst);
    }

    fn record_cache(&self, hit: bool) {
        let counter = if hit {
            &self.cache_hits
        } else {
            &self.cache_misses
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}
