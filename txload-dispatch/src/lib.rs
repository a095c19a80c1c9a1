//! Dispatch engine and schedule driver for txload
//!
//! The engine turns one slice's TPS target into a pool of paced connections
//! doing read-modify-write cycles against the shared record store. The driver
//! launches one engine run per schedule entry.

pub mod driver;
pub mod engine;
pub mod plan;
pub mod report;
pub mod target;

// Re-export commonly used types
pub use driver::ScheduleDriver;
pub use engine::DispatchEngine;
pub use plan::{requests_per_connection, SlicePlan};
pub use report::{ConnectionOutcome, RunReport, SliceReport};
pub use target::Target;
