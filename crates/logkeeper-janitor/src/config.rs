//! Configuration for Janitor operations
//!
//! Defines the archiving and deletion windows, the log roots to process and the
//! operational modes of a run.

use crate::JanitorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// One configured source of logs
///
/// Accepts either a bare path or a table with explicit subdirectories:
///
/// ```toml
/// log_dirs = [
///     "/var/log/nginx",
///     { path = "/var/log/app", subdirs = ["api", "worker"] },
///     { path = "/var/log/batch", recursive = false },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRootEntry {
    /// Just the directory
    Path(PathBuf),

    /// Directory with per-root options
    Detailed {
        /// Log root directory
        path: PathBuf,

        /// Subdirectories (relative to `path`) to process instead of walking
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subdirs: Option<Vec<PathBuf>>,

        /// Override of the global `recursive` flag
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recursive: Option<bool>,
    },
}

impl LogRootEntry {
    /// The root directory of this entry
    pub fn path(&self) -> &Path {
        match self {
            LogRootEntry::Path(path) => path,
            LogRootEntry::Detailed { path, .. } => path,
        }
    }
}

impl From<PathBuf> for LogRootEntry {
    fn from(path: PathBuf) -> Self {
        LogRootEntry::Path(path)
    }
}

impl From<&str> for LogRootEntry {
    fn from(path: &str) -> Self {
        LogRootEntry::Path(PathBuf::from(path))
    }
}

/// A log root with its options resolved against the global configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LogRoot {
    /// Root directory
    pub path: PathBuf,

    /// Explicit subdirectories, relative to `path`
    pub subdirs: Option<Vec<PathBuf>>,

    /// Walk nested subdirectories when no explicit list is given
    pub recursive: bool,
}

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use logkeeper_janitor::JanitorConfig;
///
/// // Default configuration (balanced)
/// let config = JanitorConfig::default();
/// assert_eq!(config.archiving_window, 7.0);
/// assert_eq!(config.deletion_window, 21.0);
///
/// // Aggressive cleanup
/// let config = JanitorConfig::aggressive();
/// assert_eq!(config.archiving_window, 3.0);
///
/// // Lenient cleanup
/// let config = JanitorConfig::lenient();
/// assert_eq!(config.deletion_window, 90.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Files strictly older than this many days are archived
    #[serde(alias = "archiving_interval")]
    pub archiving_window: f64,

    /// Bundles strictly older than this many days are deleted
    #[serde(alias = "deletion_interval")]
    pub deletion_window: f64,

    /// Base directory of all archive trees
    pub archives_dir: PathBuf,

    /// Ordered log roots
    #[serde(alias = "log_directories")]
    pub log_dirs: Vec<LogRootEntry>,

    /// Filename substrings restricting which files are archived (absent = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_types: Option<Vec<String>>,

    /// Directory receiving the JSON run summary (absent = no report file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,

    /// Walk nested subdirectories of log roots and archive roots
    /// Default: true
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Dry-run mode: log what would be archived or deleted without touching anything
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// How often the background worker runs a cycle (in minutes)
    /// Default: 1440 (daily)
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

fn default_recursive() -> bool {
    true
}

fn default_sweep_interval_minutes() -> u64 {
    24 * 60
}

impl Default for JanitorConfig {
    /// Balanced retention: archive after 7 days, delete bundles after 21
    fn default() -> Self {
        Self {
            archiving_window: 7.0,
            deletion_window: 21.0,
            archives_dir: PathBuf::from("archives"),
            log_dirs: Vec::new(),
            file_types: None,
            report_dir: None,
            recursive: true,
            dry_run: false,
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

impl JanitorConfig {
    /// Aggressive retention for disk-constrained hosts (3 / 7 days)
    pub fn aggressive() -> Self {
        Self {
            archiving_window: 3.0,
            deletion_window: 7.0,
            ..Self::default()
        }
    }

    /// Lenient retention for hosts where history matters (14 / 90 days)
    pub fn lenient() -> Self {
        Self {
            archiving_window: 14.0,
            deletion_window: 90.0,
            ..Self::default()
        }
    }

    /// Builder-style helper to set the roots and archive base
    pub fn with_dirs<I, E>(mut self, archives_dir: impl Into<PathBuf>, log_dirs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<LogRootEntry>,
    {
        self.archives_dir = archives_dir.into();
        self.log_dirs = log_dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }

    /// Resolve every log root against the global options
    pub fn log_roots(&self) -> Vec<LogRoot> {
        self.log_dirs
            .iter()
            .map(|entry| match entry {
                LogRootEntry::Path(path) => LogRoot {
                    path: path.clone(),
                    subdirs: None,
                    recursive: self.recursive,
                },
                LogRootEntry::Detailed {
                    path,
                    subdirs,
                    recursive,
                } => LogRoot {
                    path: path.clone(),
                    subdirs: subdirs.clone(),
                    recursive: recursive.unwrap_or(self.recursive),
                },
            })
            .collect()
    }

    /// Whether a file name passes the `file_types` filter
    ///
    /// An absent or empty list admits every file.
    pub fn accepts_file(&self, file_name: &str) -> bool {
        match &self.file_types {
            Some(types) if !types.is_empty() => {
                types.iter().any(|pattern| file_name.contains(pattern.as_str()))
            }
            _ => true,
        }
    }

    /// Check the configuration before any scanning
    ///
    /// Fatal problems return `JanitorError::Config`; suspicious but workable settings
    /// are logged as warnings.
    pub fn validate(&self) -> Result<(), JanitorError> {
        for (name, value) in [
            ("archiving_window", self.archiving_window),
            ("deletion_window", self.deletion_window),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(JanitorError::Config(format!(
                    "{} must be a non-negative number of days, got {}",
                    name, value
                )));
            }
        }

        if self.archives_dir.as_os_str().is_empty() {
            return Err(JanitorError::Config("archives_dir must not be empty".into()));
        }

        if self.log_dirs.is_empty() {
            return Err(JanitorError::Config("log_dirs must list at least one directory".into()));
        }

        if self.sweep_interval_minutes == 0 {
            return Err(JanitorError::Config("sweep_interval_minutes must be at least 1".into()));
        }

        let mut basenames: HashMap<String, PathBuf> = HashMap::new();
        for root in self.log_roots() {
            if root.path.as_os_str().is_empty() {
                return Err(JanitorError::Config("log_dirs contains an empty path".into()));
            }

            for subdir in root.subdirs.iter().flatten() {
                let escapes = subdir
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
                if escapes {
                    return Err(JanitorError::Config(format!(
                        "subdir {} of {} must be relative and stay inside the root",
                        subdir.display(),
                        root.path.display()
                    )));
                }
            }

            let basename = root
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match basenames.get(&basename) {
                Some(previous) => tracing::warn!(
                    "log roots {} and {} share the name '{}'; their archives land in the same directory",
                    previous.display(),
                    root.path.display(),
                    basename
                ),
                None => {
                    basenames.insert(basename, root.path.clone());
                }
            }
        }

        if self.deletion_window < self.archiving_window {
            tracing::warn!(
                "deletion_window ({} days) is shorter than archiving_window ({} days)",
                self.deletion_window,
                self.archiving_window
            );
        }

        if let Some(dir) = self.report_dir.as_ref().filter(|_| self.report_dir_in_archives()) {
            tracing::warn!(
                "report_dir {} is inside archives_dir; it is left out of the deletion sweep",
                dir.display()
            );
        }

        Ok(())
    }

    /// Whether run reports are written somewhere under `archives_dir`
    pub fn report_dir_in_archives(&self) -> bool {
        self.report_dir
            .as_ref()
            .is_some_and(|dir| dir.starts_with(&self.archives_dir))
    }
}
