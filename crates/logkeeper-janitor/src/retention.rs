//! Deletion of expired archives

use crate::scanner::{is_within_any, list_files, list_subdirectories};
use crate::{JanitorError, LocalFs, RunControl};
use logkeeper_domain::{AgeClassifier, LogFs, RunCounts};
use std::path::{Path, PathBuf};

/// Removes archive files older than the deletion window
///
/// Only files are considered; directories of the archive tree are left in place even
/// when they end up empty.
#[derive(Debug, Clone)]
pub struct RetentionSweeper<F: LogFs = LocalFs> {
    fs: F,
    control: RunControl,
    dry_run: bool,
    excluded: Vec<PathBuf>,
}

impl<F: LogFs> RetentionSweeper<F> {
    /// Create a sweeper over the given filesystem
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            control: RunControl::new(),
            dry_run: false,
            excluded: Vec::new(),
        }
    }

    /// Stop between files when `control` says so
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Only log what would be deleted
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Leave these directories and everything below them alone in [`sweep_tree`]
    ///
    /// [`sweep_tree`]: RetentionSweeper::sweep_tree
    pub fn with_excluded(mut self, excluded: Vec<PathBuf>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Sweep the immediate files of `archive_dir`
    ///
    /// `total` counts the expired files found; files still inside the window are
    /// not counted at all. An unreadable `archive_dir` is a `Directory` error.
    pub fn sweep(
        &self,
        archive_dir: &Path,
        now_epoch: f64,
        deletion_window_days: f64,
    ) -> Result<RunCounts, JanitorError> {
        self.sweep_dir(archive_dir, now_epoch, deletion_window_days)
            .map(|(counts, _)| counts)
    }

    /// Sweep one directory, also returning the entries that could not be examined
    fn sweep_dir(
        &self,
        archive_dir: &Path,
        now_epoch: f64,
        deletion_window_days: f64,
    ) -> Result<(RunCounts, Vec<JanitorError>), JanitorError> {
        let classifier = AgeClassifier::new(now_epoch, deletion_window_days);
        let (files, errors) = list_files(archive_dir)?;

        let expired: Vec<_> = files
            .into_iter()
            .filter(|file| classifier.classify(file.modified_epoch).is_candidate)
            .collect();

        let mut counts = RunCounts {
            total: expired.len(),
            ..RunCounts::new()
        };

        for (index, file) in expired.iter().enumerate() {
            if self.control.should_stop() {
                counts.skipped += expired.len() - index;
                tracing::info!("Run stopped, {} expired archive(s) kept", expired.len() - index);
                break;
            }

            if self.dry_run {
                tracing::info!("DRY RUN: Would delete {}", file.path.display());
                counts.skipped += 1;
                continue;
            }

            match self.fs.remove(&file.path) {
                Ok(()) => {
                    tracing::info!("Deleted expired archive {}", file.path.display());
                    counts.succeeded += 1;
                }
                Err(e) => {
                    let error = JanitorError::Delete {
                        path: file.path.clone(),
                        source: e,
                    };
                    tracing::warn!("{}", error);
                    counts.failed += 1;
                }
            }
        }

        Ok((counts, errors))
    }

    /// Sweep `archive_dir` and, when `recursive`, every directory below it
    ///
    /// A directory that cannot be listed, or an entry whose metadata cannot be read,
    /// is reported in the returned errors and the sweep moves on. Excluded
    /// directories are not touched.
    pub fn sweep_tree(
        &self,
        archive_dir: &Path,
        now_epoch: f64,
        deletion_window_days: f64,
        recursive: bool,
    ) -> (RunCounts, Vec<JanitorError>) {
        let mut counts = RunCounts::new();
        let mut errors = Vec::new();
        if is_within_any(archive_dir, &self.excluded) {
            tracing::debug!("Not sweeping excluded {}", archive_dir.display());
            return (counts, errors);
        }

        let mut dirs = vec![archive_dir.to_path_buf()];
        if recursive {
            let (nested, walk_errors) = list_subdirectories(archive_dir, &self.excluded);
            dirs.extend(nested);
            errors.extend(walk_errors);
        }

        for dir in dirs {
            match self.sweep_dir(&dir, now_epoch, deletion_window_days) {
                Ok((dir_counts, dir_errors)) => {
                    counts += dir_counts;
                    errors.extend(dir_errors);
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    errors.push(e);
                }
            }
        }
        (counts, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::epoch_secs;
    use std::fs::{self, File};
    use std::io;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const DAY: u64 = 86_400;

    fn aged(path: &Path, days: u64, now: SystemTime) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"PK").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(now - Duration::from_secs(days * DAY))
            .unwrap();
    }

    struct NoRemove;

    impl LogFs for NoRemove {
        fn open(&self, path: &Path) -> io::Result<Box<dyn io::Read>> {
            Ok(Box::new(File::open(path)?))
        }

        fn remove(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        aged(&dir.path().join("recent.zip"), 20, now);
        aged(&dir.path().join("old.zip"), 22, now);

        let counts = RetentionSweeper::new(LocalFs)
            .sweep(dir.path(), epoch_secs(now), 21.0)
            .unwrap();

        assert_eq!(counts.total, 1);
        assert_eq!(counts.succeeded, 1);
        assert!(dir.path().join("recent.zip").exists());
        assert!(!dir.path().join("old.zip").exists());
    }

    #[test]
    fn test_sweep_ignores_nested_without_recursion() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        let nested = dir.path().join("web/old.zip");
        aged(&nested, 30, now);

        let counts = RetentionSweeper::new(LocalFs)
            .sweep(dir.path(), epoch_secs(now), 21.0)
            .unwrap();

        assert_eq!(counts.total, 0);
        assert!(nested.exists());
    }

    #[test]
    fn test_sweep_tree_recurses() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        let nested: PathBuf = dir.path().join("web/2026/old.zip");
        aged(&nested, 30, now);
        aged(&dir.path().join("old.zip"), 30, now);

        let (counts, errors) =
            RetentionSweeper::new(LocalFs).sweep_tree(dir.path(), epoch_secs(now), 21.0, true);

        assert_eq!(counts.succeeded, 2);
        assert!(errors.is_empty());
        assert!(!nested.exists());
        assert!(dir.path().join("web/2026").is_dir());
    }

    #[test]
    fn test_sweep_tree_skips_excluded() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        let report = dir.path().join("reports/report_2026-01-01.json");
        aged(&report, 30, now);
        aged(&dir.path().join("app/old.zip"), 30, now);

        let sweeper =
            RetentionSweeper::new(LocalFs).with_excluded(vec![dir.path().join("reports")]);
        let (nested, _) = sweeper.sweep_tree(dir.path(), epoch_secs(now), 21.0, true);
        let (direct, _) =
            sweeper.sweep_tree(&dir.path().join("reports"), epoch_secs(now), 21.0, false);

        assert_eq!(nested.succeeded, 1);
        assert_eq!(direct.total, 0);
        assert!(report.exists());
        assert!(!dir.path().join("app/old.zip").exists());
    }

    #[test]
    fn test_delete_failures_are_counted() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        aged(&dir.path().join("a.zip"), 30, now);
        aged(&dir.path().join("b.zip"), 30, now);

        let counts = RetentionSweeper::new(NoRemove)
            .sweep(dir.path(), epoch_secs(now), 21.0)
            .unwrap();

        assert_eq!(counts.total, 2);
        assert_eq!(counts.failed, 2);
        assert!(counts.is_balanced());
    }

    #[test]
    fn test_dry_run_keeps_files() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        aged(&dir.path().join("old.zip"), 30, now);

        let counts = RetentionSweeper::new(LocalFs)
            .with_dry_run(true)
            .sweep(dir.path(), epoch_secs(now), 21.0)
            .unwrap();

        assert_eq!(counts.skipped, 1);
        assert!(dir.path().join("old.zip").exists());
    }

    #[test]
    fn test_missing_archive_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let result = RetentionSweeper::new(LocalFs).sweep(&dir.path().join("gone"), 0.0, 21.0);
        assert!(matches!(result, Err(JanitorError::Directory { .. })));
    }
}
