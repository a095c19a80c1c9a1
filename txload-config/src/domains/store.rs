//! Record store configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Records seeded at startup (`user_1 ..= user_<record_count>`)
    #[serde(default = "default_record_count")]
    pub record_count: usize,

    /// Store implementation
    #[serde(default)]
    pub backend: StoreBackend,

    /// Shard count for the sharded backend
    #[serde(default = "default_shards")]
    pub shards: usize,
}

/// Store implementation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// One reader/writer lock over the whole map
    #[default]
    Locked,

    /// Independent reader/writer locks per key-hash shard
    Sharded,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "locked" => Ok(StoreBackend::Locked),
            "sharded" => Ok(StoreBackend::Sharded),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            record_count: default_record_count(),
            backend: StoreBackend::default(),
            shards: default_shards(),
        }
    }
}

impl Validatable for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.record_count, "record_count", self.domain_name())?;

        if self.backend == StoreBackend::Sharded {
            validate_positive(self.shards, "shards", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "store"
    }
}

fn default_record_count() -> usize {
    500_000
}

fn default_shards() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.record_count, 500_000);
        assert_eq!(config.backend, StoreBackend::Locked);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sharded_requires_shards() {
        let config = StoreConfig {
            record_count: 10,
            backend: StoreBackend::Sharded,
            shards: 0,
        };
        assert!(config.validate().is_err());

        // Shard count is irrelevant to the locked backend
        let config = StoreConfig {
            backend: StoreBackend::Locked,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(StoreBackend::from_str("Sharded").unwrap(), StoreBackend::Sharded);
        assert!(StoreBackend::from_str("redis").is_err());
    }
}
