use anyhow::Result;
use tracing_subscriber::EnvFilter;
use txload_config::{LogFormat, LoggingConfig};

/// Build the filter used by [`init_logging`].
///
/// Precedence: an explicit override (e.g. `--log-level`), then the configured
/// level plus directives, then `RUST_LOG`, then `info`.
pub fn build_env_filter(config: &LoggingConfig, override_level: Option<&str>) -> EnvFilter {
    if let Some(level) = override_level {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }

    let mut spec = config.level.to_string();
    for directive in &config.directives {
        spec.push(',');
        spec.push_str(directive.trim());
    }

    EnvFilter::try_new(&spec)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging from configuration
pub fn init_logging(config: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let env_filter = build_env_filter(config, override_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // Use try_init to avoid panic if global subscriber already set
    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt().with_env_filter(env_filter).try_init().is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}
