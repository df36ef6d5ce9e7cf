//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use logkeeper_domain::RunCounts;
use logkeeper_janitor::{JanitorConfig, LogRoot, PhaseReport, RunReport};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Banner printed before a run.
    pub fn run_banner(&self, config_path: &Path, config: &JanitorConfig) -> String {
        let mut text = format!(
            "Logkeeper started at {}\n\
             Archiving files older than {} days, deleting archives older than {} days\n\
             Configuration: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            config.archiving_window,
            config.deletion_window,
            config_path.display()
        );
        if config.dry_run {
            text.push_str("\nDry run: nothing will be changed");
        }
        self.colorize(&text, "cyan")
    }

    /// Format a run report.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
        }
    }

    /// Format a run report as a table.
    fn format_report_table(&self, report: &RunReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Phase", "Directory", "Found", "Succeeded", "Failed", "Skipped", "New bundles"]);

        for (phase, counts) in [("archive", &report.archive), ("delete", &report.deletion)] {
            push_phase(&mut builder, phase, counts);
        }

        let mut totals = report.archive.totals;
        totals += report.deletion.totals;
        builder.push_record(counts_record("total", "", &totals));

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut lines = vec![table.to_string()];
        lines.push(format!("Elapsed: {:.2}s", report.elapsed_secs));

        if report.cancelled {
            lines.push(self.warning("Run was stopped before completion"));
        }
        for error in &report.errors {
            lines.push(self.error(error));
        }

        let failed = report.archive.totals.failed + report.deletion.totals.failed;
        if failed > 0 {
            lines.push(self.warning(&format!("{} file(s) failed, see the log for details", failed)));
        } else if report.errors.is_empty() && !report.cancelled {
            lines.push(self.success("Run completed"));
        }

        lines.join("\n")
    }

    /// Format the loaded configuration.
    pub fn format_config(&self, path: &Path, config: &JanitorConfig) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(config)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Setting", "Value"]);
        builder.push_record(["config file".to_string(), path.display().to_string()]);
        builder.push_record(["archiving_window".to_string(), format!("{} days", config.archiving_window)]);
        builder.push_record(["deletion_window".to_string(), format!("{} days", config.deletion_window)]);
        builder.push_record(["archives_dir".to_string(), config.archives_dir.display().to_string()]);
        for root in config.log_roots() {
            builder.push_record(["log_dir".to_string(), describe_root(&root)]);
        }
        let file_types = match &config.file_types {
            Some(types) if !types.is_empty() => types.join(", "),
            _ => "all files".to_string(),
        };
        builder.push_record(["file_types".to_string(), file_types]);
        let report_dir = config
            .report_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        builder.push_record(["report_dir".to_string(), report_dir]);
        builder.push_record(["recursive".to_string(), config.recursive.to_string()]);
        builder.push_record(["dry_run".to_string(), config.dry_run.to_string()]);
        builder.push_record([
            "sweep_interval".to_string(),
            format!("{} minutes", config.sweep_interval_minutes),
        ]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(format!("{}\n{}", table, self.success("Configuration is valid")))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn push_phase(builder: &mut Builder, phase: &str, report: &PhaseReport) {
    for dir in &report.directories {
        let location = dir.source.display().to_string();
        builder.push_record(counts_record(phase, &location, &dir.counts));
    }
}

fn counts_record(phase: &str, location: &str, counts: &RunCounts) -> [String; 7] {
    [
        phase.to_string(),
        location.to_string(),
        counts.total.to_string(),
        counts.succeeded.to_string(),
        counts.failed.to_string(),
        counts.skipped.to_string(),
        counts.bundles_created.to_string(),
    ]
}

fn describe_root(root: &LogRoot) -> String {
    let mut text = root.path.display().to_string();
    match &root.subdirs {
        Some(subdirs) => {
            let names: Vec<String> = subdirs.iter().map(|s| s.display().to_string()).collect();
            text.push_str(&format!(" (subdirs: {})", names.join(", ")));
        }
        None if root.recursive => text.push_str(" (recursive)"),
        None => {}
    }
    text
}
