//! Domain-driven configuration management for txload
//!
//! Configuration is split by functional domain (server, dispatch, store,
//! logging) plus the load schedule, with validation, defaults, and
//! environment variable overrides.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    dispatch::{DispatchConfig, PacingMode},
    logging::{LogFormat, LogLevel, LoggingConfig},
    server::ServerConfig,
    store::{StoreBackend, StoreConfig},
    TxLoadConfig,
};
