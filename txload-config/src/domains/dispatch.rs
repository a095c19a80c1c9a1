//! Dispatch engine and schedule driver configuration

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use txload_core::PortRange;

/// Dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Host the transaction server runs on
    #[serde(default = "default_host")]
    pub host: String,

    /// Server ports; connection `i` dials port `i mod count` of this range
    #[serde(default = "crate::domains::utils::default_port_range")]
    pub ports: PortRange,

    /// Connections opened per slice
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Upper bound on requests sent over one connection in one slice
    #[serde(default = "default_max_requests_per_connection")]
    pub max_requests_per_connection: u32,

    /// Delay between two slice launches (milliseconds)
    #[serde(
        rename = "launch_interval_ms",
        with = "crate::domains::utils::serde_duration_millis",
        default = "default_launch_interval"
    )]
    pub launch_interval: Duration,

    /// Deadline for a single dial, send or reply read (seconds)
    #[serde(
        with = "crate::domains::utils::serde_duration_option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub io_timeout: Option<Duration>,

    /// How requests within a slice are spaced out
    #[serde(default)]
    pub pacing: PacingMode,

    /// Bytes read per reply
    #[serde(default = "crate::domains::utils::default_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Request pacing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Sleep `1000 / remaining` ms after each request, `remaining` being the
    /// slice's outstanding budget
    #[default]
    Remaining,
    /// Send back to back
    Disabled,
}

impl FromStr for PacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remaining" => Ok(PacingMode::Remaining),
            "disabled" | "off" | "none" => Ok(PacingMode::Disabled),
            _ => Err(format!("Invalid pacing mode: {}", s)),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            ports: PortRange::default(),
            pool_size: default_pool_size(),
            max_requests_per_connection: default_max_requests_per_connection(),
            launch_interval: default_launch_interval(),
            io_timeout: None,
            pacing: PacingMode::default(),
            read_buffer_size: crate::domains::utils::default_read_buffer_size(),
        }
    }
}

impl Validatable for DispatchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.host, "host", self.domain_name())?;
        validate_port_range(&self.ports, "ports", self.domain_name())?;
        validate_positive(self.pool_size, "pool_size", self.domain_name())?;
        validate_positive(
            self.max_requests_per_connection,
            "max_requests_per_connection",
            self.domain_name(),
        )?;
        validate_positive(self.read_buffer_size, "read_buffer_size", self.domain_name())?;

        if let Some(timeout) = self.io_timeout {
            if timeout.is_zero() {
                return Err(self.validation_error("io_timeout must be greater than 0"));
            }
        }

        if self.pool_size < usize::from(self.ports.count) {
            tracing::warn!(
                "dispatch.pool_size {} is smaller than the port count {}; some ports get no traffic",
                self.pool_size,
                self.ports.count
            );
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "dispatch"
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_pool_size() -> usize {
    10
}

fn default_max_requests_per_connection() -> u32 {
    100
}

fn default_launch_interval() -> Duration {
    Duration::from_secs(1)
}
