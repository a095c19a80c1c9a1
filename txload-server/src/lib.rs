//! Transaction server for txload
//!
//! Listens on a contiguous block of ports. Every accepted connection gets its
//! own task that reads one record at a time and answers with a transaction id
//! of the form `tx_<port>_<nanos>`.

pub mod connection;
pub mod id;
pub mod server;

// Re-export commonly used types
pub use connection::ConnectionContext;
pub use id::TransactionIdGenerator;
pub use server::{BoundPort, ServerHandle, ServerStats, TransactionServer};
