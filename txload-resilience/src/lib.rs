//! Resilience patterns for txload
//!
//! Graceful shutdown coordination shared by the server, the dispatcher and the
//! CLI, plus an optional deadline wrapper for socket I/O.

pub mod deadline;
pub mod shutdown;

// Re-export commonly used types
pub use deadline::with_deadline;
pub use shutdown::{ShutdownCoordinator, ShutdownError, ShutdownListener, ShutdownSignal, TaskGuard};
