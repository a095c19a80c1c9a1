//! The record store contract

use crate::stats::StoreStats;
use std::sync::Arc;

/// Concurrent map from record key to record value.
///
/// Operations on one key are linearizable. `get` never observes a partially
/// written value. A read followed by a write is two operations, not one.
pub trait RecordStore: Send + Sync {
    /// Current value of `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the value of `key`, inserting it when absent
    fn set(&self, key: &str, value: String);

    /// Number of records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Operation counters
    fn stats(&self) -> StoreStats;
}

/// Store handle shared between the dispatcher's connection tasks
pub type SharedRecordStore = Arc<dyn RecordStore>;
