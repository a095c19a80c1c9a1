use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use txload_config::{ConfigError, ConfigLoader, TxLoadConfig};

mod cli;
mod commands;
mod signal;

use cli::{Cli, Commands, ConfigCommands};

/// Exit status for a failed run: configuration problems get their own code
fn exit_code(error: &anyhow::Error) -> u8 {
    if error.chain().any(|cause| cause.is::<ConfigError>()) {
        2
    } else {
        1
    }
}

/// Load configuration from the given file, or from the environment alone
fn load_config(config_path: Option<&PathBuf>) -> Result<TxLoadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            loader
                .from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))
        }
        None => loader
            .from_env()
            .context("Failed to load configuration from environment"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // If no subcommand is provided, print help
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        cmd.print_help().context("Failed to print help")?;
        println!();
        return Ok(());
    };

    if let Commands::Config { config_cmd } = &command {
        txload_logging::init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
        return match config_cmd {
            ConfigCommands::Validate { config_file } => commands::config::validate(config_file),
            ConfigCommands::Generate { output, force } => commands::config::generate(output, *force),
        };
    }

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            txload_logging::init_simple_tracing(cli.log_level.as_deref().unwrap_or("info"))?;
            return Err(e);
        }
    };
    txload_logging::init_logging(&config.logging, cli.log_level.as_deref())?;

    info!("txload {} starting", env!("CARGO_PKG_VERSION"));

    match command {
        Commands::Serve => commands::serve::serve(config).await,
        Commands::Drive { host, pacing } => commands::drive::drive(config, host, pacing).await,
        Commands::Run { pacing } => commands::run::run(config, pacing).await,
        // Handled before configuration loading
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
