//! Transaction id generation

use std::sync::atomic::{AtomicU64, Ordering};
use txload_core::TransactionId;

/// Issues transaction ids for one port.
///
/// The timestamp part is the wall clock in nanoseconds, bumped to `last + 1`
/// whenever the clock has not moved, so ids from one port never repeat and
/// always increase.
#[derive(Debug)]
pub struct TransactionIdGenerator {
    port: u16,
    last: AtomicU64,
}

impl TransactionIdGenerator {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            last: AtomicU64::new(0),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Next id for this port
    pub fn next_id(&self) -> TransactionId {
        let now = now_nanos();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        TransactionId::new(self.port, now.max(previous.saturating_add(1)))
    }
}

fn now_nanos() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .unwrap_or(0)
}
