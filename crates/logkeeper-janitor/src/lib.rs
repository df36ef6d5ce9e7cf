//! Logkeeper Janitor
//!
//! Scheduled housekeeping for directory trees of log files.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Archiving**: compressing log files older than the archiving window into dated
//!   zip bundles, one per directory and modification date
//! - **Mirroring**: keeping the archive tree shaped like the log tree it came from
//! - **Retention**: deleting archives older than the deletion window
//! - **Reporting**: summarizing every run as a machine-readable [`RunReport`]
//!
//! # Architecture
//!
//! A run is a fixed sequence of phases (see [`logkeeper_domain::RunPhase`]). Every log
//! root is archived before any archive is considered for deletion, and all ages are
//! measured against one "now" taken at the start of the run.
//!
//! | Phase | Work | Failure scope |
//! |-------|------|---------------|
//! | **Scanning (archive)** | Classify files by modification time | Unreadable metadata skips the file |
//! | **Writing (archive)** | Append to `<DD-MM-YYYY>.zip`, remove sources | Per file; the bundle is never left half-written |
//! | **Scanning (deletion)** | Classify archives by modification time | Unreadable directory skips that directory |
//! | **Deleting** | Remove expired archives | Per file |
//! | **Reporting** | Summarize, optionally write `report_<YYYY-MM-DD>.json` | Returned after the run |
//!
//! # Usage
//!
//! ## One-time Run
//!
//! ```no_run
//! use logkeeper_janitor::{Janitor, JanitorConfig, RunControl};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = JanitorConfig::default().with_dirs("/srv/archives", ["/var/log/app"]);
//! let mut janitor = Janitor::new(config);
//!
//! let report = janitor.run(&RunControl::new())?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use logkeeper_janitor::{JanitorConfig, JanitorWorker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JanitorConfig::default().with_dirs("/srv/archives", ["/var/log/app"]);
//!     let mut worker = JanitorWorker::new(config);
//!
//!     // Run indefinitely (until Ctrl+C)
//!     worker.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The Janitor can be configured via TOML or JSON:
//!
//! ```toml
//! archiving_window = 7
//! deletion_window = 21
//! archives_dir = "/srv/archives"
//! log_dirs = ["/var/log/nginx", { path = "/var/log/app", subdirs = ["api"] }]
//! file_types = [".log"]
//! report_dir = "/srv/reports"
//! recursive = true
//! dry_run = false
//! sweep_interval_minutes = 1440
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod control;
mod fs;
mod scanner;
mod mirror;
mod writer;
mod retention;
mod report;
mod janitor;
mod worker;

pub use error::JanitorError;
pub use config::{JanitorConfig, LogRoot, LogRootEntry};
pub use control::RunControl;
pub use fs::LocalFs;
pub use scanner::{
    epoch_secs, list_child_directories, list_files, list_subdirectories, scan_directory,
    ListedFile, ScanOutcome,
};
pub use mirror::PathMirror;
pub use writer::{bundle_entry_names, staging_path, ArchiveWriter};
pub use retention::RetentionSweeper;
pub use report::{DirectoryReport, PhaseReport, RunReport};
pub use janitor::Janitor;
pub use worker::JanitorWorker;
