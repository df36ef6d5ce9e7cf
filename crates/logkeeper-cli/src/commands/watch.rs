//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use logkeeper_janitor::{JanitorConfig, JanitorWorker};
use std::path::Path;

/// Apply command-line overrides to the loaded configuration.
pub fn apply_overrides(args: &WatchArgs, config: &mut JanitorConfig) -> Result<()> {
    if let Some(minutes) = args.interval_minutes {
        if minutes == 0 {
            return Err(CliError::InvalidInput(
                "--interval-minutes must be at least 1".to_string(),
            ));
        }
        config.sweep_interval_minutes = minutes;
    }
    if args.dry_run {
        config.dry_run = true;
    }
    Ok(())
}

/// Execute the watch command.
pub async fn execute_watch(
    args: WatchArgs,
    mut config: JanitorConfig,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    apply_overrides(&args, &mut config)?;

    if formatter.format() == OutputFormat::Table {
        println!("{}", formatter.run_banner(config_path, &config));
        println!(
            "{}",
            formatter.info(&format!(
                "Running every {} minute(s), press Ctrl+C to stop",
                config.sweep_interval_minutes
            ))
        );
    }

    let mut worker = JanitorWorker::new(config);
    worker.run().await?;

    if let Some(report) = worker.last_report() {
        println!("{}", formatter.format_report(report)?);
    }
    if formatter.format() == OutputFormat::Table {
        println!(
            "{}",
            formatter.success(&format!("Stopped after {} run(s)", worker.cycles_completed()))
        );
    }
    Ok(())
}
