//! Cache usage statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests answered by an already materialized instance.
    pub hits: u64,
    /// Requests that materialized a new instance.
    pub misses: u64,
    /// Number of distinct keys currently materialized.
    pub entry_count: u64,
    /// Factory invocations that returned an error.
    pub failures: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lock-free counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Materialized entries; every miss creates exactly one.
    pub(crate) fn entries(&self) -> u64 {
        self.misses.load(Ordering::Acquire)
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        let misses = self.misses.load(Ordering::Acquire);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses,
            entry_count: misses,
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
