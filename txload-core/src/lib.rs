//! Core types for txload
//!
//! This crate holds the domain types shared by the server, the dispatcher and
//! the configuration layer, together with the error taxonomy that decides
//! whether a failure is fatal, local to one port, or local to one connection.

pub mod error;
pub mod schedule;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, ErrorPolicy, IoStage, Result, TxLoadError};
pub use schedule::{Schedule, SliceEntry};
pub use types::{PortRange, TransactionId};
