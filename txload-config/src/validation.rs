//! Per-section validation

use crate::error::{ConfigError, ConfigResult};
use txload_core::PortRange;

/// A configuration section that can check itself
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Section name used in error messages
    fn domain_name(&self) -> &'static str;

    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        section_error(self.domain_name(), message)
    }
}

fn section_error(domain: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::DomainError {
        domain: domain.to_string(),
        message: message.into(),
    }
}

pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(section_error(domain, format!("{} must be set", field_name)));
    }
    Ok(())
}

/// Rejects zero and, for signed types, negatives
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value > T::default() {
        return Ok(());
    }
    Err(section_error(
        domain,
        format!("{} must be greater than 0, got {}", field_name, value),
    ))
}

/// `count` ports starting right after `base`, all within `u16`
pub fn validate_port_range(range: &PortRange, field_name: &str, domain: &str) -> ConfigResult<()> {
    if range.count == 0 {
        return Err(section_error(domain, format!("{} covers no port", field_name)));
    }
    if !range.is_valid() {
        return Err(section_error(
            domain,
            format!("{} {}+{} runs past port {}", field_name, range.base, range.count, u16::MAX),
        ));
    }
    if range.first() < 1024 {
        tracing::warn!(first = range.first(), "{} starts below port 1024", field_name);
    }
    Ok(())
}
