//! The housekeeping pipeline: archive old logs, then delete expired archives

use crate::scanner::{
    epoch_secs, is_within_any, list_child_directories, list_subdirectories, scan_directory,
};
use crate::{
    ArchiveWriter, JanitorConfig, JanitorError, LocalFs, LogRoot, PathMirror, RetentionSweeper,
    RunControl, RunReport,
};
use chrono::{DateTime, Utc};
use logkeeper_domain::{group, mirrored_dir, AgeClassifier, LogFs, RunCounts, RunPhase};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Janitor service for log archiving and archive retention
///
/// Responsible for:
/// - Compressing log files older than the archiving window into dated bundles
/// - Mirroring the log tree structure under the archive base
/// - Deleting archives older than the deletion window
/// - Summarizing every run in a [`RunReport`]
///
/// # Examples
///
/// ```no_run
/// use logkeeper_janitor::{Janitor, JanitorConfig, RunControl};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = JanitorConfig::default().with_dirs("/srv/archives", ["/var/log/app"]);
/// let mut janitor = Janitor::new(config);
///
/// let report = janitor.run(&RunControl::new())?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor<F: LogFs = LocalFs> {
    config: JanitorConfig,
    fs: F,
    phase: RunPhase,
    last_report: Option<RunReport>,
}

impl Janitor<LocalFs> {
    /// Create a new Janitor over the local filesystem
    pub fn new(config: JanitorConfig) -> Self {
        Self::with_fs(config, LocalFs)
    }
}

impl<F: LogFs> Janitor<F> {
    /// Create a Janitor reading and removing files through `fs`
    pub fn with_fs(config: JanitorConfig, fs: F) -> Self {
        Self {
            config,
            fs,
            phase: RunPhase::Idle,
            last_report: None,
        }
    }

    /// The configuration this Janitor runs with
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Current phase of the run state machine
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Report of the most recent completed run
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Perform one complete housekeeping run
    ///
    /// This is the main entry point. It:
    /// 1. Validates the configuration (the only failure that aborts before scanning)
    /// 2. Archives every log root, in configured order
    /// 3. Sweeps every archive root for expired bundles
    /// 4. Writes the run report when `report_dir` is set
    ///
    /// Per-file and per-directory failures end up in the report. The only error
    /// returned after scanning started is a report that could not be written; the
    /// report itself is still available through [`Janitor::last_report`].
    pub fn run(&mut self, control: &RunControl) -> Result<RunReport, JanitorError> {
        self.config.validate()?;

        let now = SystemTime::now();
        let now_epoch = epoch_secs(now);
        let started_at: DateTime<Utc> = now.into();
        let mut report = RunReport::new(
            started_at,
            self.config.archiving_window,
            self.config.deletion_window,
        );
        report.dry_run = self.config.dry_run;

        tracing::info!(
            "Starting run {} (archive after {} days, delete after {} days{})",
            report.run_id,
            self.config.archiving_window,
            self.config.deletion_window,
            if self.config.dry_run { ", dry run" } else { "" }
        );

        let mut stopped = false;

        self.enter(RunPhase::ScanningArchive);
        let classifier = AgeClassifier::new(now_epoch, self.config.archiving_window);
        for root in self.config.log_roots() {
            if control.should_stop() {
                stopped = true;
                break;
            }
            stopped |= self.archive_root(&root, &classifier, control, &mut report);
        }
        if self.phase == RunPhase::ScanningArchive {
            self.enter(RunPhase::WritingArchive);
        }

        self.enter(RunPhase::ScanningDeletion);
        if !stopped {
            stopped = self.sweep_archives(now_epoch, control, &mut report);
        }
        if self.phase == RunPhase::ScanningDeletion {
            self.enter(RunPhase::Deleting);
        }

        self.enter(RunPhase::Reporting);
        let control_skipped = !self.config.dry_run
            && (report.archive.totals.skipped > 0 || report.deletion.totals.skipped > 0);
        report.cancelled = stopped || control_skipped;
        report.finish(Utc::now());

        tracing::info!("Run {} finished in {:.2}s", report.run_id, report.elapsed_secs);
        tracing::info!("\n{}", report.summary());

        self.last_report = Some(report.clone());
        let written = match &self.config.report_dir {
            Some(dir) => report.write_to(dir).map(|_| ()),
            None => Ok(()),
        };
        self.enter(RunPhase::Idle);

        written.map(|()| report)
    }

    /// Archive one log root and its subdirectories
    ///
    /// Returns whether the run was stopped while processing it.
    fn archive_root(
        &mut self,
        root: &LogRoot,
        classifier: &AgeClassifier,
        control: &RunControl,
        report: &mut RunReport,
    ) -> bool {
        if !root.path.is_dir() {
            let error = JanitorError::directory(&root.path, "log directory does not exist");
            tracing::error!("{}", error);
            report.record_error(&error);
            return false;
        }

        let subdirs: Vec<PathBuf> = match &root.subdirs {
            Some(list) => list.iter().map(|s| root.path.join(s)).collect(),
            None if root.recursive => {
                let (dirs, errors) =
                    list_subdirectories(&root.path, std::slice::from_ref(&self.config.archives_dir));
                for error in &errors {
                    report.record_error(error);
                }
                dirs
            }
            None => Vec::new(),
        };
        tracing::info!("{}: {} subdir(s) detected", root.path.display(), subdirs.len());

        for dir in std::iter::once(root.path.clone()).chain(subdirs) {
            if control.should_stop() {
                return true;
            }
            match self.archive_directory(root, &dir, classifier, control) {
                Ok((archive_dir, counts, scan_errors)) => {
                    for error in &scan_errors {
                        report.record_error(error);
                    }
                    report.archive.record(dir, Some(archive_dir), counts)
                }
                Err(error) => {
                    tracing::error!("Skipping {}: {}", dir.display(), error);
                    report.record_error(&error);
                }
            }
        }
        false
    }

    /// Mirror, scan, group and write one log directory
    ///
    /// Entries that could not be examined are returned next to the counts.
    fn archive_directory(
        &mut self,
        root: &LogRoot,
        dir: &Path,
        classifier: &AgeClassifier,
        control: &RunControl,
    ) -> Result<(PathBuf, RunCounts, Vec<JanitorError>), JanitorError> {
        if self.phase == RunPhase::WritingArchive {
            self.enter(RunPhase::ScanningArchive);
        }

        let mirror = PathMirror::new(&self.config.archives_dir);
        let subdir = (dir != root.path).then_some(dir);
        let archive_dir = if self.config.dry_run {
            mirror.resolve(&root.path, subdir)?
        } else {
            mirror.ensure(&root.path, subdir)?
        };

        let config = &self.config;
        let outcome = scan_directory(dir, &root.path, classifier, |name| config.accepts_file(name))?;
        tracing::info!(
            "Logs detected in {}: {} file(s), {} past the archiving window",
            dir.display(),
            outcome.scanned,
            outcome.candidates.len()
        );

        let groups = group(outcome.candidates, &archive_dir);
        self.enter(RunPhase::WritingArchive);
        let counts = ArchiveWriter::new(&self.fs)
            .with_control(control.clone())
            .with_dry_run(self.config.dry_run)
            .write(&groups, &archive_dir);

        tracing::info!(
            "{} -> {}: {} archived, {} failed, {} new bundle(s)",
            dir.display(),
            archive_dir.display(),
            counts.succeeded,
            counts.failed,
            counts.bundles_created
        );
        Ok((archive_dir, counts, outcome.errors))
    }

    /// Delete expired archives under every archive root
    ///
    /// An archive root is walked when recursion is on globally, or when a log root
    /// mirrored into it writes nested archive directories. `report_dir` is never
    /// swept. Returns whether the run was stopped during the sweep.
    fn sweep_archives(&mut self, now_epoch: f64, control: &RunControl, report: &mut RunReport) -> bool {
        let archives_dir = self.config.archives_dir.clone();
        if !archives_dir.is_dir() {
            tracing::info!("No archives at {} yet", archives_dir.display());
            return false;
        }

        let roots = match list_child_directories(&archives_dir) {
            Ok(roots) => roots,
            Err(error) => {
                tracing::error!("{}", error);
                report.record_error(&error);
                return false;
            }
        };

        let nested = self.nested_archive_roots();
        let excluded: Vec<PathBuf> = self.config.report_dir.iter().cloned().collect();
        let roots = roots
            .into_iter()
            .filter(|dir| !is_within_any(dir, &excluded));

        for archive_root in roots {
            if control.should_stop() {
                return true;
            }
            let recursive = self.config.recursive
                || archive_root
                    .file_name()
                    .is_some_and(|name| nested.contains(name));
            if self.phase == RunPhase::Deleting {
                self.enter(RunPhase::ScanningDeletion);
            }
            self.enter(RunPhase::Deleting);

            let (counts, errors) = RetentionSweeper::new(&self.fs)
                .with_control(control.clone())
                .with_dry_run(self.config.dry_run)
                .with_excluded(excluded.clone())
                .sweep_tree(&archive_root, now_epoch, self.config.deletion_window, recursive);
            for error in &errors {
                report.record_error(error);
            }

            tracing::info!(
                "{}: {} expired, {} deleted, {} failed",
                archive_root.display(),
                counts.total,
                counts.succeeded,
                counts.failed
            );
            report.deletion.record(archive_root, None, counts);
        }
        false
    }

    /// Names of the archive roots that hold nested archive directories
    fn nested_archive_roots(&self) -> HashSet<OsString> {
        self.config
            .log_roots()
            .iter()
            .filter(|root| root.recursive || root.subdirs.is_some())
            .filter_map(|root| mirrored_dir(&root.path, &self.config.archives_dir, None).ok())
            .filter_map(|dir| dir.file_name().map(|name| name.to_os_string()))
            .collect()
    }

    fn enter(&mut self, to: RunPhase) {
        if !self.phase.can_transition_to(to) {
            tracing::warn!("Unexpected phase change {} -> {}", self.phase, to);
        }
        tracing::debug!("Phase {} -> {}", self.phase, to);
        self.phase = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    const DAY: u64 = 86_400;

    fn aged(path: &Path, days: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(days * DAY))
            .unwrap();
    }

    fn backdate(path: &Path, days: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(days * DAY))
            .unwrap();
    }

    fn bundles_in(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "zip"))
            .collect()
    }

    fn setup() -> (TempDir, JanitorConfig) {
        let tmp = TempDir::new().unwrap();
        let logs = tmp.path().join("logs/app");
        fs::create_dir_all(&logs).unwrap();
        let config = JanitorConfig::default().with_dirs(tmp.path().join("archives"), [logs]);
        (tmp, config)
    }

    #[test]
    fn test_invalid_config_aborts() {
        let mut janitor = Janitor::new(JanitorConfig::default());
        let err = janitor.run(&RunControl::new()).unwrap_err();
        assert!(matches!(err, JanitorError::Config(_)));
        assert_eq!(janitor.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_run_returns_to_idle() {
        let (tmp, config) = setup();
        aged(&tmp.path().join("logs/app/old.log"), 10);

        let mut janitor = Janitor::new(config);
        let report = janitor.run(&RunControl::new()).unwrap();

        assert_eq!(janitor.phase(), RunPhase::Idle);
        assert_eq!(report.archive.totals.succeeded, 1);
        assert_eq!(janitor.last_report(), Some(&report));
    }

    #[test]
    fn test_missing_root_is_recorded_and_skipped() {
        let (tmp, mut config) = setup();
        aged(&tmp.path().join("logs/app/old.log"), 10);
        config.log_dirs.insert(0, tmp.path().join("logs/missing").into());

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("missing"));
        assert_eq!(report.archive.totals.succeeded, 1);
    }

    #[test]
    fn test_archives_inside_log_root_are_not_rearchived() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("app");
        let config = JanitorConfig::default().with_dirs(root.join("archives"), [root.clone()]);
        aged(&root.join("old.log"), 10);

        let mut janitor = Janitor::new(config);
        janitor.run(&RunControl::new()).unwrap();
        let second = janitor.run(&RunControl::new()).unwrap();

        assert_eq!(second.archive.totals.total, 0);
        let bundles: Vec<_> = fs::read_dir(root.join("archives/app")).unwrap().collect();
        assert_eq!(bundles.len(), 1);
    }

    #[test]
    fn test_explicit_subdirs_replace_walk() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("app");
        aged(&root.join("api/old.log"), 10);
        aged(&root.join("worker/old.log"), 10);
        let mut config = JanitorConfig::default();
        config.archives_dir = tmp.path().join("archives");
        config.log_dirs = vec![crate::LogRootEntry::Detailed {
            path: root.clone(),
            subdirs: Some(vec![PathBuf::from("api")]),
            recursive: None,
        }];

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert_eq!(report.archive.totals.succeeded, 1);
        assert!(root.join("worker/old.log").exists());
        assert!(tmp.path().join("archives/app/api").is_dir());
    }

    #[test]
    fn test_non_recursive_root_skips_subdirectories() {
        let (tmp, mut config) = setup();
        config.recursive = false;
        aged(&tmp.path().join("logs/app/nested/old.log"), 10);

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert_eq!(report.archive.totals.total, 0);
        assert!(tmp.path().join("logs/app/nested/old.log").exists());
    }

    #[test]
    fn test_cancelled_run_is_marked() {
        let (tmp, config) = setup();
        aged(&tmp.path().join("logs/app/old.log"), 10);
        let control = RunControl::new();
        control.cancel();

        let report = Janitor::new(config).run(&control).unwrap();

        assert!(report.cancelled);
        assert!(tmp.path().join("logs/app/old.log").exists());
        assert_eq!(report.archive.totals.succeeded, 0);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let (tmp, mut config) = setup();
        config.dry_run = true;
        aged(&tmp.path().join("logs/app/old.log"), 10);

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert!(report.dry_run);
        assert!(!report.cancelled);
        assert_eq!(report.archive.totals.skipped, 1);
        assert!(tmp.path().join("logs/app/old.log").exists());
        assert!(!tmp.path().join("archives").exists());
    }

    #[test]
    fn test_report_is_written_when_configured() {
        let (tmp, mut config) = setup();
        config.report_dir = Some(tmp.path().join("reports"));

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert!(tmp.path().join("reports").join(report.file_name()).is_file());
    }

    #[test]
    fn test_unwritable_report_is_error_after_run() {
        let (tmp, mut config) = setup();
        aged(&tmp.path().join("logs/app/old.log"), 10);
        let blocker = tmp.path().join("reports");
        fs::write(&blocker, b"file").unwrap();
        config.report_dir = Some(blocker);

        let mut janitor = Janitor::new(config);
        let err = janitor.run(&RunControl::new()).unwrap_err();

        assert!(matches!(err, JanitorError::Report { .. }));
        assert!(!tmp.path().join("logs/app/old.log").exists());
        assert_eq!(janitor.last_report().map(|r| r.archive.totals.succeeded), Some(1));
    }

    #[test]
    fn test_subdir_bundles_expire_without_global_recursion() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("logs/app");
        aged(&root.join("api/old.log"), 10);
        let mut config = JanitorConfig::default();
        config.recursive = false;
        config.archives_dir = tmp.path().join("archives");
        config.log_dirs = vec![crate::LogRootEntry::Detailed {
            path: root.clone(),
            subdirs: Some(vec![PathBuf::from("api")]),
            recursive: None,
        }];

        let mut janitor = Janitor::new(config);
        janitor.run(&RunControl::new()).unwrap();
        let mirror = tmp.path().join("archives/app/api");
        let bundles = bundles_in(&mirror);
        assert_eq!(bundles.len(), 1);
        backdate(&bundles[0], 30);

        let report = janitor.run(&RunControl::new()).unwrap();

        assert_eq!(report.deletion.totals.total, 1);
        assert_eq!(report.deletion.totals.succeeded, 1);
        assert!(bundles_in(&mirror).is_empty());
    }

    #[test]
    fn test_recursive_root_override_expires_nested_bundles() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("logs/app");
        aged(&root.join("web/old.log"), 10);
        let mut config = JanitorConfig::default();
        config.recursive = false;
        config.archives_dir = tmp.path().join("archives");
        config.log_dirs = vec![crate::LogRootEntry::Detailed {
            path: root.clone(),
            subdirs: None,
            recursive: Some(true),
        }];

        let mut janitor = Janitor::new(config);
        janitor.run(&RunControl::new()).unwrap();
        let mirror = tmp.path().join("archives/app/web");
        for bundle in bundles_in(&mirror) {
            backdate(&bundle, 30);
        }

        let report = janitor.run(&RunControl::new()).unwrap();

        assert_eq!(report.deletion.totals.succeeded, 1);
        assert!(bundles_in(&mirror).is_empty());
    }

    #[test]
    fn test_unrelated_archive_roots_follow_global_recursion() {
        let (tmp, mut config) = setup();
        config.recursive = false;
        let stray = tmp.path().join("archives/retired/nested/01-01-2025.zip");
        aged(&stray, 30);

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert_eq!(report.deletion.totals.total, 0);
        assert!(stray.exists());
    }

    #[test]
    fn test_reports_inside_archives_are_not_expired() {
        let (tmp, mut config) = setup();
        let reports = tmp.path().join("archives/reports");
        let old_report = reports.join("report_2026-01-01.json");
        aged(&old_report, 30);
        let old_bundle = tmp.path().join("archives/app/01-01-2026.zip");
        aged(&old_bundle, 30);
        config.report_dir = Some(reports.clone());

        let report = Janitor::new(config).run(&RunControl::new()).unwrap();

        assert!(old_report.exists());
        assert!(reports.join(report.file_name()).is_file());
        assert!(!old_bundle.exists());
        assert_eq!(report.deletion.totals.succeeded, 1);
        assert!(report
            .deletion
            .directories
            .iter()
            .all(|dir| dir.source != reports));
    }

    #[cfg(unix)]
    #[test]
    fn test_unstatable_log_entries_reach_the_report() {
        use std::os::unix::fs::PermissionsExt;

        let (tmp, config) = setup();
        let locked = tmp.path().join("logs/app/locked");
        aged(&locked.join("old.log"), 10);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o600)).unwrap();

        let result = Janitor::new(config).run(&RunControl::new());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let report = result.unwrap();

        // Privileged users can stat the entry and archive it instead
        let archived = report.archive.totals.succeeded;
        let reported = report
            .errors
            .iter()
            .filter(|e| e.contains("old.log"))
            .count();
        assert_eq!(archived + reported, 1);
    }
}
