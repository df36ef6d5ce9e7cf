//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Logkeeper - archive old logs and expire old archives.
#[derive(Debug, Parser)]
#[command(name = "logkeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (.toml for TOML, anything else is read as JSON)
    #[arg(short, long, global = true, env = "LOGKEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Archive old logs and delete expired archives once (default)
    Run(RunArgs),

    /// Run housekeeping on a schedule until Ctrl+C
    Watch(WatchArgs),

    /// Load, validate and print the configuration
    Check,
}

/// Arguments for the run command.
#[derive(Debug, Default, Parser)]
pub struct RunArgs {
    /// Log what would be archived or deleted without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the JSON run report (overrides the configuration)
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Minutes between runs (overrides the configuration)
    #[arg(short, long)]
    pub interval_minutes: Option<u64>,

    /// Log what would be archived or deleted without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Log filter directive implied by `--verbose` / `--quiet`
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}
