//! Error types for Janitor operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during Janitor operations
///
/// Only `Config` aborts a run. `Directory` aborts the affected directory's subtree,
/// and the per-file variants (`Scan`, `Write`, `Delete`) are logged, tallied and
/// never propagated past the directory being processed.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File metadata could not be read during classification
    #[error("Scan error at {}: {source}", path.display())]
    Scan {
        /// File being classified
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A bundle could not be opened or appended, or a member could not be written
    #[error("Write error at {}: {reason}", path.display())]
    Write {
        /// Source file or bundle involved
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A file could not be removed
    #[error("Delete error at {}: {source}", path.display())]
    Delete {
        /// File being removed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An archive directory could not be created or listed
    #[error("Directory error at {}: {reason}", path.display())]
    Directory {
        /// Directory involved
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The run summary could not be written
    #[error("Report error at {}: {reason}", path.display())]
    Report {
        /// Report file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl JanitorError {
    /// Build a `Directory` error from anything displayable
    pub fn directory(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        JanitorError::Directory {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Write` error from anything displayable
    pub fn write(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        JanitorError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
