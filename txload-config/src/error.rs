//! Errors raised while loading or checking a txload configuration

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    /// `.yaml`/`.yml` files, and anything without a known extension
    #[error("Malformed YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Malformed JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Checks spanning several sections
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A `TXLOAD_*` override that does not parse
    #[error("Bad environment override: {0}")]
    EnvError(String),

    /// A single section failed its own checks
    #[error("[{domain}] {message}")]
    DomainError { domain: String, message: String },
}
