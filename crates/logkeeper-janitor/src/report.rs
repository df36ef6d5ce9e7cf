//! Run summary for one housekeeping pass

use crate::JanitorError;
use chrono::{DateTime, Local, Utc};
use logkeeper_domain::RunCounts;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Counts for one processed directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryReport {
    /// Log directory (archive phase) or archive root (deletion phase)
    pub source: PathBuf,

    /// Archive directory the bundles went to (archive phase only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,

    /// Tally for this directory
    pub counts: RunCounts,
}

/// Per-directory counts of one phase and their sum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    /// Sum over all directories
    pub totals: RunCounts,

    /// Directories in processing order
    pub directories: Vec<DirectoryReport>,
}

impl PhaseReport {
    /// Create an empty phase report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one directory and add it to the totals
    pub fn record(&mut self, source: impl Into<PathBuf>, archive_dir: Option<PathBuf>, counts: RunCounts) {
        self.totals += counts;
        self.directories.push(DirectoryReport {
            source: source.into(),
            archive_dir,
            counts,
        });
    }
}

/// Machine-readable summary of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique, time-ordered run identifier
    pub run_id: Uuid,

    /// When the run fixed its "now"
    pub started_at: DateTime<Utc>,

    /// When reporting began
    pub finished_at: DateTime<Utc>,

    /// Wall-clock duration of the run in seconds
    pub elapsed_secs: f64,

    /// Archiving window in days
    pub archiving_window_days: f64,

    /// Deletion window in days
    pub deletion_window_days: f64,

    /// Whether the run only logged its actions
    pub dry_run: bool,

    /// Whether the run stopped early
    pub cancelled: bool,

    /// Archive phase counts
    pub archive: PhaseReport,

    /// Deletion phase counts
    pub deletion: PhaseReport,

    /// Directory-level errors and entries that could not be examined, in the order
    /// they happened
    #[serde(default)]
    pub errors: Vec<String>,
}

impl RunReport {
    /// Start a report for a run beginning at `started_at`
    pub fn new(started_at: DateTime<Utc>, archiving_window_days: f64, deletion_window_days: f64) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at: started_at,
            elapsed_secs: 0.0,
            archiving_window_days,
            deletion_window_days,
            dry_run: false,
            cancelled: false,
            archive: PhaseReport::new(),
            deletion: PhaseReport::new(),
            errors: Vec::new(),
        }
    }

    /// Stamp the end of the run
    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = finished_at;
        self.elapsed_secs = (finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
    }

    /// Record a directory-level error
    pub fn record_error(&mut self, error: &JanitorError) {
        self.errors.push(error.to_string());
    }

    /// Whether nothing failed in either phase
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.archive.totals.is_clean() && self.deletion.totals.is_clean()
    }

    /// Report file name for this run: `report_<YYYY-MM-DD>.json` in local time
    pub fn file_name(&self) -> String {
        format!(
            "report_{}.json",
            self.started_at.with_timezone(&Local).format("%Y-%m-%d")
        )
    }

    /// Write the report as pretty JSON into `dir`, creating it if needed
    ///
    /// A report from an earlier run on the same date is replaced.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, JanitorError> {
        let path = dir.join(self.file_name());
        let report_err = |reason: &dyn std::fmt::Display| JanitorError::Report {
            path: path.clone(),
            reason: reason.to_string(),
        };

        fs::create_dir_all(dir).map_err(|e| report_err(&e))?;
        let json = serde_json::to_string_pretty(self).map_err(|e| report_err(&e))?;
        fs::write(&path, json).map_err(|e| report_err(&e))?;

        tracing::info!("Run report written to {}", path.display());
        Ok(path)
    }

    /// Generate a plain-text summary of the run
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Logkeeper Run Summary"),
            format!("====================="),
            format!("Run: {}", self.run_id),
            format!("Started: {}", self.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")),
            format!("Elapsed: {:.2}s", self.elapsed_secs),
            format!(
                "Windows: archive after {} days, delete after {} days",
                self.archiving_window_days, self.deletion_window_days
            ),
        ];
        if self.dry_run {
            lines.push("Mode: dry run (nothing changed)".to_string());
        }
        if self.cancelled {
            lines.push("Run was stopped before completion".to_string());
        }
        lines.push(String::new());

        for (title, phase) in [("Archived", &self.archive), ("Deleted", &self.deletion)] {
            lines.push(format!("{}:", title));
            for dir in &phase.directories {
                lines.push(format!("  {}: {}", dir.source.display(), format_counts(&dir.counts)));
            }
            lines.push(format!("  Total: {}", format_counts(&phase.totals)));
            lines.push(String::new());
        }

        if !self.errors.is_empty() {
            lines.push(format!("Errors ({}):", self.errors.len()));
            for error in &self.errors {
                lines.push(format!("  {}", error));
            }
        }

        lines.join("\n")
    }
}

fn format_counts(counts: &RunCounts) -> String {
    let mut text = format!(
        "{} found, {} succeeded, {} failed",
        counts.total, counts.succeeded, counts.failed
    );
    if counts.skipped > 0 {
        text.push_str(&format!(", {} skipped", counts.skipped));
    }
    if counts.bundles_created > 0 {
        text.push_str(&format!(", {} new bundle(s)", counts.bundles_created));
    }
    text
}
