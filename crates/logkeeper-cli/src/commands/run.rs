//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;
use logkeeper_janitor::{Janitor, JanitorConfig, JanitorError, RunControl, RunReport};
use std::path::Path;

/// Apply command-line overrides to the loaded configuration.
pub fn apply_overrides(args: &RunArgs, config: &mut JanitorConfig) {
    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(dir) = &args.report_dir {
        config.report_dir = Some(dir.clone());
    }
}

/// Execute the run command.
///
/// The pass runs on the blocking pool; Ctrl+C stops it between files and the
/// partial report is still printed.
pub async fn execute_run(
    args: RunArgs,
    mut config: JanitorConfig,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    apply_overrides(&args, &mut config);

    if formatter.format() == OutputFormat::Table {
        println!("{}", formatter.run_banner(config_path, &config));
    }

    let control = RunControl::new();
    let (result, report) = {
        let pass_control = control.clone();
        let mut handle = tokio::task::spawn_blocking(move || run_once(config, &pass_control));

        tokio::select! {
            joined = &mut handle => joined,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{}", formatter.warning("Interrupted, finishing the current file"));
                control.cancel();
                (&mut handle).await
            }
        }
        .map_err(|e| JanitorError::Worker(e.to_string()))?
    };

    if let Some(report) = report {
        println!("{}", formatter.format_report(&report)?);
    }
    result?;
    Ok(())
}

/// Run one pass, keeping the report even when writing it failed.
fn run_once(
    config: JanitorConfig,
    control: &RunControl,
) -> (std::result::Result<RunReport, JanitorError>, Option<RunReport>) {
    let mut janitor = Janitor::new(config);
    let result = janitor.run(control);
    let report = janitor.last_report().cloned();
    (result, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_overrides() {
        let mut config = JanitorConfig::default();
        let args = RunArgs {
            dry_run: true,
            report_dir: Some(PathBuf::from("/srv/reports")),
        };

        apply_overrides(&args, &mut config);

        assert!(config.dry_run);
        assert_eq!(config.report_dir, Some(PathBuf::from("/srv/reports")));
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = JanitorConfig {
            dry_run: true,
            ..JanitorConfig::default()
        };
        apply_overrides(&RunArgs::default(), &mut config);
        assert!(config.dry_run);
        assert!(config.report_dir.is_none());
    }

    #[tokio::test]
    async fn test_execute_run_archives_and_reports() {
        let tmp = TempDir::new().unwrap();
        let logs = tmp.path().join("app");
        fs::create_dir_all(&logs).unwrap();
        let old = logs.join("old.log");
        fs::write(&old, b"old\n").unwrap();
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(10 * 86_400))
            .unwrap();

        let config = JanitorConfig::default().with_dirs(tmp.path().join("archives"), [logs]);
        let args = RunArgs {
            dry_run: false,
            report_dir: Some(tmp.path().join("reports")),
        };
        let formatter = Formatter::new(OutputFormat::Json, false);

        execute_run(args, config, Path::new("config.json"), &formatter)
            .await
            .unwrap();

        assert!(!old.exists());
        assert_eq!(fs::read_dir(tmp.path().join("reports")).unwrap().count(), 1);
    }
}
