//! Logging setup for txload
//!
//! Every crate logs through `tracing` macros. This crate installs the global
//! subscriber once, from the `logging` configuration domain.

pub mod init;

pub use init::{build_env_filter, init_logging, init_simple_tracing};
