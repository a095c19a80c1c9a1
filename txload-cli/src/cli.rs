//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (JSON for .json, YAML otherwise)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the transaction server until interrupted
    Serve,

    /// Seed the record store and replay the TPS schedule against a running server
    Drive {
        /// Server host, overrides dispatch.host
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Pacing mode: remaining, disabled
        #[arg(long, value_name = "MODE")]
        pacing: Option<String>,
    },

    /// Start the server in-process, replay the schedule against it, then stop
    Run {
        /// Pacing mode: remaining, disabled
        #[arg(long, value_name = "MODE")]
        pacing: Option<String>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
