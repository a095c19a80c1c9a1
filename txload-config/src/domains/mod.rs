//! Domain-specific configuration modules

pub mod dispatch;
pub mod logging;
pub mod server;
pub mod store;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use txload_core::Schedule;

/// Main txload configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TxLoadConfig {
    /// Slice label to TPS, in launch order
    #[serde(default)]
    pub tps: Schedule,

    /// Transaction server configuration
    #[serde(default)]
    pub server: server::ServerConfig,

    /// Dispatch configuration
    #[serde(default)]
    pub dispatch: dispatch::DispatchConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: store::StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl TxLoadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.validate_schedule()?;
        self.server.validate()?;
        self.dispatch.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    fn validate_schedule(&self) -> ConfigResult<()> {
        if let Some(label) = self.tps.duplicate_label() {
            return Err(crate::ConfigError::DomainError {
                domain: "tps".to_string(),
                message: format!("slice label '{}' appears more than once", label),
            });
        }
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let mut config = TxLoadConfig::default();
        for (label, tps) in [("1", 100), ("2", 500), ("3", 1000)] {
            config.tps.push(txload_core::SliceEntry::new(label, tps));
        }
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
