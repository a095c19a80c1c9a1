//! Shared record store for txload
//!
//! A concurrent map from record key to record value. The dispatcher reads a
//! record, ships it to the transaction server, and writes it back with the
//! returned transaction id appended.

pub mod corpus;
pub mod stats;
pub mod store;
pub mod stores;

use std::sync::Arc;
use txload_config::{StoreBackend, StoreConfig};

// Re-export commonly used types
pub use corpus::{record_key, record_value, seed};
pub use stats::{StatsCollector, StoreStats};
pub use store::{RecordStore, SharedRecordStore};
pub use stores::{LockedRecordStore, ShardedRecordStore};

/// Build an empty store for the configured backend
pub fn create_store(config: &StoreConfig) -> SharedRecordStore {
    match config.backend {
        StoreBackend::Locked => Arc::new(LockedRecordStore::with_capacity(config.record_count)),
        StoreBackend::Sharded => Arc::new(ShardedRecordStore::with_capacity(
            config.shards,
            config.record_count,
        )),
    }
}

/// Build the configured store and seed `record_count` records into it
pub fn create_seeded_store(config: &StoreConfig) -> SharedRecordStore {
    let store = create_store(config);
    seed(store.as_ref(), config.record_count);
    store
}
