use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use duchenne_core::Telemetry;
use serde::Serialize;

/// Usage totals for one UTC day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub requests: u64,
    pub faces_scored: u64,
    pub faces_rejected: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySnapshot {
    pub day: NaiveDate,
    #[serde(flatten)]
    pub stats: DailyStats,
}

struct DayRecord {
    day: NaiveDate,
    stats: DailyStats,
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Per-UTC-day usage counters.
///
/// Every event first checks the clock; when the UTC date has moved on the
/// previous day's totals are dropped and counting restarts from zero.
pub struct DailyCounters {
    record: Mutex<DayRecord>,
    today: Clock,
}

impl DailyCounters {
    pub fn new() -> Self {
        Self::with_clock(|| Utc::now().date_naive())
    }

    pub fn with_clock(today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        let day = today();
        Self {
            record: Mutex::new(DayRecord {
                day,
                stats: DailyStats::default(),
            }),
            today: Box::new(today),
        }
    }

    /// Totals for the current day.
    pub fn snapshot(&self) -> DaySnapshot {
        let record = self.current();
        DaySnapshot {
            day: record.day,
            stats: record.stats,
        }
    }

    fn current(&self) -> MutexGuard<'_, DayRecord> {
        let today = (self.today)();
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        if record.day != today {
            tracing::debug!(
                previous = %record.day,
                today = %today,
                requests = record.stats.requests,
                "day rolled over, counters reset"
            );
            *record = DayRecord {
                day: today,
                stats: DailyStats::default(),
            };
        }
        record
    }
}

impl Default for DailyCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry for DailyCounters {
    fn record_request(&self) {
        self.current().stats.requests += 1;
    }

    fn record_faces(&self, scored: usize, rejected: usize) {
        let mut record = self.current();
        record.stats.faces_scored += scored as u64;
        record.stats.faces_rejected += rejected as u64;
    }

    fn record_cache(&self, hit: bool) {
        let mut record = self.current();
        if hit {
            record.stats.cache_hits += 1;
        } else {
            record.stats.cache_misses += 1;
        }
    }
}
