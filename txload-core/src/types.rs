//! Shared domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transaction identifier returned by the server for every record.
///
/// Rendered on the wire as `tx_<port>_<timestamp>`, the timestamp being a
/// nanosecond epoch value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId {
    port: u16,
    timestamp: u64,
}

impl TransactionId {
    /// Wire prefix of every identifier
    pub const PREFIX: &'static str = "tx_";

    pub fn new(port: u16, timestamp: u64) -> Self {
        Self { port, timestamp }
    }

    /// Port the request was served on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Nanosecond timestamp component
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}_{}", Self::PREFIX, self.port, self.timestamp)
    }
}

/// Error returned when a string is not a transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid transaction id: {0}")]
pub struct ParseTransactionIdError(pub String);

impl FromStr for TransactionId {
    type Err = ParseTransactionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseTransactionIdError(s.to_string());

        let rest = s.strip_prefix(Self::PREFIX).ok_or_else(invalid)?;
        let (port, timestamp) = rest.split_once('_').ok_or_else(invalid)?;

        Ok(Self {
            port: port.parse().map_err(|_| invalid())?,
            timestamp: timestamp.parse().map_err(|_| invalid())?,
        })
    }
}

/// Contiguous block of ports starting immediately above `base`.
///
/// `PortRange { base: 8000, count: 10 }` covers 8001 through 8010.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    /// Port below the first port of the range
    pub base: u16,

    /// Number of ports in the range
    pub count: u16,
}

impl PortRange {
    pub fn new(base: u16, count: u16) -> Self {
        Self { base, count }
    }

    /// First port of the range
    pub fn first(&self) -> u16 {
        self.base.saturating_add(1)
    }

    /// Last port of the range
    pub fn last(&self) -> u16 {
        self.base.saturating_add(self.count)
    }

    /// Whether the range fits below `u16::MAX` and is non-empty
    pub fn is_valid(&self) -> bool {
        self.count > 0 && u32::from(self.base) + u32::from(self.count) <= u32::from(u16::MAX)
    }

    /// Ports in ascending order
    pub fn ports(&self) -> impl Iterator<Item = u16> {
        let first = u32::from(self.base) + 1;
        let last = (u32::from(self.base) + u32::from(self.count)).min(u32::from(u16::MAX));
        (first..=last).map(|p| p as u16)
    }

    pub fn contains(&self, port: u16) -> bool {
        port >= self.first() && port <= self.last() && self.count > 0
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self { base: 8000, count: 10 }
    }
}
