//! Candidate files discovered during a scan

use std::path::{Path, PathBuf};

/// A log file that crossed the archiving window
///
/// Exists only for the duration of one scan-and-write pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    /// Absolute (or root-joined) path of the file on disk
    pub path: PathBuf,

    /// Path relative to the log root it was discovered under
    pub relative_path: PathBuf,

    /// Modification time in seconds since the Unix epoch
    pub modified_epoch: f64,

    /// Age in days at the run's `now`
    pub age_days: f64,

    /// Bundle date (`DD-MM-YYYY`) derived from the modification time
    pub bucket_date: String,
}

impl CandidateFile {
    /// Create a candidate
    pub fn new(
        path: impl Into<PathBuf>,
        relative_path: impl Into<PathBuf>,
        modified_epoch: f64,
        age_days: f64,
        bucket_date: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            modified_epoch,
            age_days,
            bucket_date: bucket_date.into(),
        }
    }

    /// File name component, if any
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// The on-disk path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
