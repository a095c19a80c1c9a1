//! Record store implementations

pub mod locked;
pub mod sharded;

pub use locked::LockedRecordStore;
pub use sharded::ShardedRecordStore;
