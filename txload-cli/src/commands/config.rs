//! `txload config` subcommands

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info};
use txload_config::{ConfigLoader, TxLoadConfig};

/// Handle configuration validation
pub fn validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    match ConfigLoader::new().from_file(config_file) {
        Ok(config) => {
            println!("Configuration file is valid");
            println!(
                "  {} slices, {} total TPS, {} server ports, pool size {}",
                config.tps.len(),
                config.tps.total_tps(),
                config.server.ports.count,
                config.dispatch.pool_size
            );
            Ok(())
        }
        Err(e) => {
            println!("Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e).with_context(|| format!("Invalid configuration file {:?}", config_file))
        }
    }
}

/// Handle configuration generation
pub fn generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, TxLoadConfig::generate_sample())
        .with_context(|| format!("Failed to write configuration to {:?}", output))?;

    println!("Configuration written to {:?}", output);
    Ok(())
}
