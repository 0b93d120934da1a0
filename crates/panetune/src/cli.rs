//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Inspect and resolve panel customization documents.
#[derive(Debug, Parser)]
#[command(name = "panetune", version, about)]
pub struct Cli {
    /// Logging controls.
    #[command(flatten)]
    pub logs: LogArgs,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Logging controls for the CLI.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with = "log_filter")]
    pub debug: bool,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "config=trace,panetune=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a configuration document.
    Check {
        /// Path to the JSON document.
        file: PathBuf,
    },
    /// Print the effective configuration for a viewer context.
    Resolve {
        /// Path to the JSON document.
        file: PathBuf,

        /// Viewer name.
        #[arg(long, default_value = "")]
        user: String,

        /// Device name.
        #[arg(long, default_value = "")]
        device: String,

        /// Raw user-agent string.
        #[arg(long, default_value = "")]
        user_agent: String,

        /// Viewer has the admin flag.
        #[arg(long)]
        admin: bool,

        /// Viewer owns the installation.
        #[arg(long)]
        owner: bool,

        /// Emit the effective configuration as JSON.
        #[arg(long)]
        json: bool,
    },
}
