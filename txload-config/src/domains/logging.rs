//! Logging configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the global `tracing` subscriber is set up
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Baseline verbosity
    pub level: LogLevel,

    /// Output layout
    pub format: LogFormat,

    /// Extra filter directives, e.g. `txload_server=debug`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<String>,

    /// Print file and line of each event
    pub include_location: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    #[default]
    Text,
    Compact,
    /// Multi-line, for local debugging
    Pretty,
}

/// Accepted spellings, first one canonical
const LEVEL_NAMES: &[(LogLevel, &[&str])] = &[
    (LogLevel::Error, &["error"]),
    (LogLevel::Warn, &["warn", "warning"]),
    (LogLevel::Info, &["info"]),
    (LogLevel::Debug, &["debug"]),
    (LogLevel::Trace, &["trace"]),
];

const FORMAT_NAMES: &[(LogFormat, &str)] = &[
    (LogFormat::Json, "json"),
    (LogFormat::Text, "text"),
    (LogFormat::Compact, "compact"),
    (LogFormat::Pretty, "pretty"),
];

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(self) -> &'static str {
        LEVEL_NAMES
            .iter()
            .find(|(level, _)| *level == self)
            .map_or("info", |(_, names)| names[0])
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        LEVEL_NAMES
            .iter()
            .find(|(_, names)| names.contains(&wanted.as_str()))
            .map(|(level, _)| *level)
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORMAT_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(format, _)| *format)
            .ok_or_else(|| format!("Invalid log format: {}", s))
    }
}

impl Validatable for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        for directive in &self.directives {
            if directive.trim().is_empty() {
                return Err(self.validation_error("directives cannot contain empty entries"));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "logging"
    }
}
