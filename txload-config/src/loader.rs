//! Configuration loading and environment variable handling

use crate::domains::TxLoadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "TXLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a file with environment overrides.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<TxLoadConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut config: TxLoadConfig = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<TxLoadConfig> {
        let mut config = TxLoadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<TxLoadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut TxLoadConfig) -> ConfigResult<()> {
        self.apply_server_overrides(config)?;
        self.apply_dispatch_overrides(&mut config.dispatch)?;
        self.apply_store_overrides(&mut config.store)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Port overrides move the server and the dispatcher together
    fn apply_server_overrides(&self, config: &mut TxLoadConfig) -> ConfigResult<()> {
        if let Some(base) = self.parse_env_var::<u16>("BASE_PORT")? {
            config.server.ports.base = base;
            config.dispatch.ports.base = base;
        }

        if let Some(count) = self.parse_env_var::<u16>("PORT_COUNT")? {
            config.server.ports.count = count;
            config.dispatch.ports.count = count;
        }

        if let Ok(bind) = self.get_env_var("BIND_ADDRESS") {
            config.server.bind_address = bind;
        }

        Ok(())
    }

    /// Apply dispatch config overrides
    fn apply_dispatch_overrides(
        &self,
        config: &mut crate::domains::dispatch::DispatchConfig,
    ) -> ConfigResult<()> {
        if let Ok(host) = self.get_env_var("DISPATCH_HOST") {
            config.host = host;
        }

        if let Some(pool_size) = self.parse_env_var::<usize>("POOL_SIZE")? {
            config.pool_size = pool_size;
        }

        if let Ok(pacing) = self.get_env_var("PACING") {
            config.pacing = crate::domains::dispatch::PacingMode::from_str(&pacing)
                .map_err(|_| ConfigError::EnvError(format!("Invalid PACING: {}", pacing)))?;
        }

        Ok(())
    }

    /// Apply store config overrides
    fn apply_store_overrides(
        &self,
        config: &mut crate::domains::store::StoreConfig,
    ) -> ConfigResult<()> {
        if let Some(count) = self.parse_env_var::<usize>("RECORD_COUNT")? {
            config.record_count = count;
        }

        if let Ok(backend) = self.get_env_var("STORE_BACKEND") {
            config.backend = crate::domains::store::StoreBackend::from_str(&backend)
                .map_err(|_| ConfigError::EnvError(format!("Invalid STORE_BACKEND: {}", backend)))?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Parse a prefixed environment variable if it is set
    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            Err(_) => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
