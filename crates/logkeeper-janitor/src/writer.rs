//! Bundle writing: appending grouped candidates to dated zip bundles
//!
//! Every group is written to a staging copy of its bundle and committed with an
//! atomic rename, so a bundle on disk is always a complete generation. Sources are
//! removed only after the generation holding them has been committed.
//!
//! A member that breaks part-way leaves the staging file unusable. The stage is then
//! rebuilt from the last committed generation and the files staged so far are
//! staged again, so one bad file never costs the rest of its group.

use crate::{JanitorError, LocalFs, RunControl};
use chrono::{Datelike, Local, Timelike};
use logkeeper_domain::bundle::dedup_entry_name;
use logkeeper_domain::{BundleGroups, BundleKey, CandidateFile, LogFs, RunCounts};
use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

/// Suffix of the staging file kept next to a bundle while it is rewritten
pub const STAGING_SUFFIX: &str = "partial";

/// Staging path for `bundle`: `.<bundle name>.partial` in the same directory
pub fn staging_path(bundle: &Path) -> PathBuf {
    let name = bundle
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    bundle.with_file_name(format!(".{}.{}", name, STAGING_SUFFIX))
}

/// Names of the entries already stored in a bundle
pub fn bundle_entry_names(bundle: &Path) -> Result<HashSet<String>, JanitorError> {
    let file = File::open(bundle).map_err(|e| JanitorError::write(bundle, e))?;
    let archive = ZipArchive::new(file).map_err(|e| JanitorError::write(bundle, e))?;
    Ok(archive.file_names().map(str::to_owned).collect())
}

/// Zip timestamp for an entry, in local time like the bundle dates
fn entry_time(modified_epoch: f64) -> zip::DateTime {
    chrono::DateTime::from_timestamp(modified_epoch.floor() as i64, 0)
        .map(|t| t.with_timezone(&Local))
        .and_then(|t| {
            let year = u16::try_from(t.year()).ok()?;
            zip::DateTime::from_date_and_time(
                year,
                t.month() as u8,
                t.day() as u8,
                t.hour() as u8,
                t.minute() as u8,
                t.second() as u8,
            )
            .ok()
        })
        .unwrap_or_default()
}

/// A bundle generation being assembled in its staging file
struct Stage {
    path: PathBuf,
    writer: Option<ZipWriter<File>>,
    names: HashSet<String>,
}

impl Stage {
    /// Start a new generation of `bundle`, seeded with its current content if any
    fn open(bundle: &Path, existed: bool) -> Result<Self, JanitorError> {
        let path = staging_path(bundle);
        let staging_err = |e: &dyn std::fmt::Display| JanitorError::write(&path, e);

        let (writer, names) = if existed {
            let names = bundle_entry_names(bundle)?;
            fs::copy(bundle, &path).map_err(|e| staging_err(&e))?;
            let file = File::options()
                .read(true)
                .write(true)
                .open(&path)
                .map_err(|e| staging_err(&e))?;
            let writer = ZipWriter::new_append(file).map_err(|e| staging_err(&e))?;
            (writer, names)
        } else {
            let file = File::create(&path).map_err(|e| staging_err(&e))?;
            (ZipWriter::new(file), HashSet::new())
        };

        Ok(Self {
            path,
            writer: Some(writer),
            names,
        })
    }

    /// Stream one member into the stage, returning the entry name it was stored under
    ///
    /// On error the stage may hold a truncated member and must be discarded.
    fn append(
        &mut self,
        name: &str,
        source: &mut dyn Read,
        modified_epoch: f64,
    ) -> Result<String, JanitorError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| JanitorError::write(&self.path, "staging file already closed"))?;

        let name = dedup_entry_name(name, &self.names);
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(entry_time(modified_epoch))
            .large_file(true);

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| JanitorError::write(&self.path, e))?;
        io::copy(source, writer).map_err(|e| JanitorError::write(&self.path, e))?;

        self.names.insert(name.clone());
        Ok(name)
    }

    /// Finish the staging file and move it over `bundle`
    fn commit(mut self, bundle: &Path) -> Result<(), JanitorError> {
        let result = self.finish_into(bundle);
        if result.is_err() {
            let _ = fs::remove_file(&self.path);
        }
        result
    }

    fn finish_into(&mut self, bundle: &Path) -> Result<(), JanitorError> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| JanitorError::write(&self.path, "staging file already closed"))?;
        let file = writer
            .finish()
            .map_err(|e| JanitorError::write(&self.path, e))?;
        file.sync_all()
            .map_err(|e| JanitorError::write(&self.path, e))?;
        fs::rename(&self.path, bundle).map_err(|e| JanitorError::write(bundle, e))
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Writes bundle groups into an archive directory
///
/// # Examples
///
/// ```no_run
/// use logkeeper_domain::{group, AgeClassifier};
/// use logkeeper_janitor::{scan_directory, ArchiveWriter, LocalFs};
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = Path::new("/var/log/app");
/// let classifier = AgeClassifier::new(1_700_000_000.0, 7.0);
/// let outcome = scan_directory(dir, dir, &classifier, |_| true)?;
///
/// let archive = Path::new("/srv/archives/app");
/// let groups = group(outcome.candidates, archive);
/// let counts = ArchiveWriter::new(LocalFs).write(&groups, archive);
/// println!("{} archived, {} failed", counts.succeeded, counts.failed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveWriter<F: LogFs = LocalFs> {
    fs: F,
    control: RunControl,
    dry_run: bool,
}

impl<F: LogFs> ArchiveWriter<F> {
    /// Create a writer over the given filesystem
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            control: RunControl::new(),
            dry_run: false,
        }
    }

    /// Stop between files when `control` says so
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Only log what would be archived
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Write every group into `archive_dir`, one bundle per date
    ///
    /// Never fails as a whole: per-file problems are logged and tallied in the
    /// returned counts.
    pub fn write(&self, groups: &BundleGroups, archive_dir: &Path) -> RunCounts {
        let mut counts = RunCounts::new();
        for (key, files) in groups.iter() {
            counts += self.write_group(key, files, archive_dir);
        }
        counts
    }

    /// Write one group into its bundle
    pub fn write_group(
        &self,
        key: &BundleKey,
        files: &[CandidateFile],
        archive_dir: &Path,
    ) -> RunCounts {
        let mut counts = RunCounts {
            total: files.len(),
            ..RunCounts::new()
        };
        let bundle = key.bundle_path_in(archive_dir);

        if self.dry_run {
            for file in files {
                tracing::info!(
                    "DRY RUN: Would archive {} into {}",
                    file.path.display(),
                    bundle.display()
                );
            }
            counts.skipped = files.len();
            return counts;
        }

        let existed = bundle.exists();
        let mut stage = match Stage::open(&bundle, existed) {
            Ok(stage) => stage,
            Err(e) => {
                tracing::warn!(
                    "Cannot open bundle {}, leaving {} file(s) in place: {}",
                    bundle.display(),
                    files.len(),
                    e
                );
                counts.failed = files.len();
                return counts;
            }
        };

        let mut pending: VecDeque<&CandidateFile> = files.iter().collect();
        let mut staged: Vec<&CandidateFile> = Vec::new();
        while let Some(file) = pending.pop_front() {
            if self.control.should_stop() {
                let remaining = pending.len() + 1;
                tracing::info!("Run stopped, {} file(s) left for {}", remaining, bundle.display());
                counts.skipped += remaining;
                break;
            }

            let mut source = match self.fs.open(&file.path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", file.path.display(), e);
                    counts.failed += 1;
                    continue;
                }
            };

            let name = key.entry_name(&file.relative_path);
            match stage.append(&name, source.as_mut(), file.modified_epoch) {
                Ok(stored) => {
                    tracing::debug!("Staged {} as {}", file.path.display(), stored);
                    staged.push(file);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to add {} to {}: {}",
                        file.path.display(),
                        bundle.display(),
                        e
                    );
                    counts.failed += 1;

                    drop(stage);
                    stage = match Stage::open(&bundle, existed) {
                        Ok(stage) => stage,
                        Err(e) => {
                            tracing::warn!(
                                "Cannot restart {}, leaving {} file(s) in place: {}",
                                bundle.display(),
                                staged.len() + pending.len(),
                                e
                            );
                            counts.failed += staged.len() + pending.len();
                            return counts;
                        }
                    };
                    if !staged.is_empty() {
                        tracing::debug!("Restaging {} file(s) for {}", staged.len(), bundle.display());
                    }
                    for file in staged.drain(..).rev() {
                        pending.push_front(file);
                    }
                }
            }
        }

        if staged.is_empty() {
            return counts;
        }

        if let Err(e) = stage.commit(&bundle) {
            tracing::warn!("Failed to commit {}: {}", bundle.display(), e);
            counts.failed += staged.len();
            return counts;
        }
        if !existed {
            counts.bundles_created += 1;
        }

        for file in staged {
            match self.fs.remove(&file.path) {
                Ok(()) => {
                    tracing::info!("Archived {} -> {}", file.path.display(), bundle.display());
                    counts.succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Archived {} but could not remove it: {}",
                        file.path.display(),
                        e
                    );
                    counts.failed += 1;
                }
            }
        }

        counts
    }
}
