//! Key-hash sharded record store

use parking_lot::RwLock;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::{stats::StatsCollector, store::RecordStore, StoreStats};

/// Independent reader/writer locks, one per shard.
///
/// A key always maps to the same shard, so per-key operations stay
/// linearizable while writers to different shards never contend.
#[derive(Debug)]
pub struct ShardedRecordStore {
    shards: Vec<RwLock<HashMap<String, String>>>,
    hasher: RandomState,
    stats: StatsCollector,
}

impl ShardedRecordStore {
    /// Create a store with `shards` shards (at least one)
    pub fn new(shards: usize) -> Self {
        Self::with_capacity(shards, 0)
    }

    /// Create with an expected total capacity spread over the shards
    pub fn with_capacity(shards: usize, capacity: usize) -> Self {
        let shards = shards.max(1);
        let per_shard = capacity.div_ceil(shards);
        Self {
            shards: (0..shards)
                .map(|_| RwLock::new(HashMap::with_capacity(per_shard)))
                .collect(),
            hasher: RandomState::new(),
            stats: StatsCollector::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: &str) -> &RwLock<HashMap<String, String>> {
        let index = (self.hasher.hash_one(key) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}

impl RecordStore for ShardedRecordStore {
    fn get(&self, key: &str) -> Option<String> {
        let value = self.shard(key).read().get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    fn set(&self, key: &str, value: String) {
        let inserted = {
            let mut shard = self.shard(key).write();
            match shard.get_mut(key) {
                Some(slot) => {
                    *slot = value;
                    false
                }
                None => {
                    shard.insert(key.to_string(), value);
                    true
                }
            }
        };
        self.stats.record_set(inserted);
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    fn stats(&self) -> StoreStats {
        self.stats.get_stats(self.len())
    }
}
