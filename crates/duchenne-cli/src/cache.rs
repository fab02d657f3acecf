use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use duchenne_core::{BatchOutcome, ContentKey, ResultCache};

/// Bounded in-memory result cache. The oldest insertion is evicted first.
pub struct MemoryCache {
    capacity: usize,
    inner: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    map: HashMap<ContentKey, BatchOutcome>,
    order: VecDeque<ContentKey>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Entries::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &ContentKey) -> Option<BatchOutcome> {
        self.lock().map.get(key).cloned()
    }

    fn put(&self, key: ContentKey, outcome: BatchOutcome) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if let Some(existing) = entries.map.get_mut(&key) {
            *existing = outcome;
            return;
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            tracing::trace!(key = %oldest, "cache entry evicted");
        }
        entries.order.push_back(key.clone());
        entries.map.insert(key, outcome);
    }
}
