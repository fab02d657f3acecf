//! Collaborator interfaces at the engine boundary.
//!
//! Usage counters and result caching are process-level concerns. They are
//! injected here and never become engine state.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::engine::{BatchOutcome, DetectionBatch, Engine};

/// Usage counters.
pub trait Telemetry: Send + Sync {
    fn record_request(&self);
    fn record_faces(&self, scored: usize, rejected: usize);
    fn record_cache(&self, hit: bool);
}

/// Telemetry sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record_request(&self) {}
    fn record_faces(&self, _scored: usize, _rejected: usize) {}
    fn record_cache(&self, _hit: bool) {}
}

/// SHA-256 hex digest of request content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn of(content: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(content)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scored outcomes keyed by request content.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &ContentKey) -> Option<BatchOutcome>;
    fn put(&self, key: ContentKey, outcome: BatchOutcome);
}

/// Engine plus its injected collaborators.
#[derive(Clone)]
pub struct ScoringService {
    engine: Engine,
    cache: Option<Arc<dyn ResultCache>>,
    telemetry: Arc<dyn Telemetry>,
}

impl ScoringService {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            cache: None,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Score a parsed batch. `content` is the raw request the batch was
    /// parsed from and keys the cache.
    pub fn score(&self, content: &[u8], batch: &DetectionBatch) -> BatchOutcome {
        self.telemetry.record_request();

        let key = self.cache.as_ref().map(|_| ContentKey::of(content));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            let cached = cache.get(key);
            self.telemetry.record_cache(cached.is_some());
            if let Some(outcome) = cached {
                tracing::debug!(key = %key, "cache hit");
                return outcome;
            }
        }

        let outcome = self.engine.assess_batch(batch);
        self.telemetry
            .record_faces(outcome.faces.len(), outcome.rejected.len());

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.put(key, outcome.clone());
        }
        outcome
    }
}
