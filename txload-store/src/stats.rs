//! Store statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of get requests
    pub total_gets: u64,

    /// Gets that found the key
    pub hits: u64,

    /// Gets that did not
    pub misses: u64,

    /// Total number of set requests
    pub total_sets: u64,

    /// Sets that created a key instead of replacing one
    pub inserts: u64,

    /// Current number of records
    pub entry_count: usize,
}

impl StoreStats {
    /// Hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        if self.total_gets > 0 {
            self.hits as f64 / self.total_gets as f64
        } else {
            0.0
        }
    }
}

/// Thread-safe statistics collector
#[derive(Debug, Default)]
pub struct StatsCollector {
    total_gets: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    total_sets: AtomicU64,
    inserts: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.total_gets.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.total_gets.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a set; `inserted` is true when the key was new
    pub fn record_set(&self, inserted: bool) {
        self.total_sets.fetch_add(1, Ordering::Relaxed);
        if inserted {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current stats
    pub fn get_stats(&self, entry_count: usize) -> StoreStats {
        StoreStats {
            total_gets: self.total_gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            total_sets: self.total_sets.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            entry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_collection() {
        let collector = StatsCollector::new();

        collector.record_hit();
        collector.record_hit();
        collector.record_miss();
        collector.record_set(false);
        collector.record_set(true);

        let stats = collector.get_stats(7);
        assert_eq!(stats.total_gets, 3);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_sets, 2);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.entry_count, 7);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_hit_rate() {
        assert_eq!(StoreStats::default().hit_rate(), 0.0);
    }
}
