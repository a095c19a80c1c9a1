//! Transaction server configuration

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use txload_core::PortRange;

/// Transaction server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address every listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Listening ports
    #[serde(default = "crate::domains::utils::default_port_range")]
    pub ports: PortRange,

    /// Bytes read from a connection per request
    #[serde(default = "crate::domains::utils::default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Close connections that stay silent for this long (seconds)
    #[serde(
        with = "crate::domains::utils::serde_duration_option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            ports: PortRange::default(),
            read_buffer_size: crate::domains::utils::default_read_buffer_size(),
            idle_timeout: None,
        }
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        validate_port_range(&self.ports, "ports", self.domain_name())?;
        validate_positive(self.read_buffer_size, "read_buffer_size", self.domain_name())?;

        if let Some(timeout) = self.idle_timeout {
            if timeout.is_zero() {
                return Err(self.validation_error("idle_timeout must be greater than 0"));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
