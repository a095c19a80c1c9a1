//! Single-lock in-memory record store

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::{stats::StatsCollector, store::RecordStore, StoreStats};

/// One reader/writer lock over the whole map
#[derive(Debug, Default)]
pub struct LockedRecordStore {
    records: RwLock<HashMap<String, String>>,
    stats: StatsCollector,
}

impl LockedRecordStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::with_capacity(capacity)),
            stats: StatsCollector::new(),
        }
    }
}

impl RecordStore for LockedRecordStore {
    fn get(&self, key: &str) -> Option<String> {
        let value = self.records.read().get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    fn set(&self, key: &str, value: String) {
        let inserted = {
            let mut records = self.records.write();
            match records.get_mut(key) {
                Some(slot) => {
                    *slot = value;
                    false
                }
                None => {
                    records.insert(key.to_string(), value);
                    true
                }
            }
        };
        self.stats.record_set(inserted);
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }

    fn stats(&self) -> StoreStats {
        self.stats.get_stats(self.len())
    }
}
