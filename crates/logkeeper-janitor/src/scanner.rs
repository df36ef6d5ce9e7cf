//! Directory scanning: listing files and classifying them by age

use crate::JanitorError;
use logkeeper_domain::{AgeClassifier, CandidateFile};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// Seconds since the Unix epoch, negative for earlier times
pub fn epoch_secs(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// A regular file found in a directory listing
#[derive(Debug, Clone)]
pub struct ListedFile {
    /// Full path
    pub path: PathBuf,
    /// Modification time in epoch seconds
    pub modified_epoch: f64,
    /// Size in bytes
    pub len: u64,
}

/// Immediate regular files of `dir`, sorted by name
///
/// Symlinks and subdirectories are ignored. Entries whose metadata cannot be read
/// are returned as `Scan` errors instead of aborting the listing; only an unreadable
/// directory is a hard error.
pub fn list_files(dir: &Path) -> Result<(Vec<ListedFile>, Vec<JanitorError>), JanitorError> {
    let reader = fs::read_dir(dir).map_err(|e| JanitorError::directory(dir, e))?;

    let mut paths = Vec::new();
    let mut errors = Vec::new();
    for entry in reader {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(source) => errors.push(JanitorError::Scan {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match file_metadata(&path) {
            Ok(Some(meta)) => match meta.modified() {
                Ok(modified) => files.push(ListedFile {
                    path,
                    modified_epoch: epoch_secs(modified),
                    len: meta.len(),
                }),
                Err(source) => errors.push(JanitorError::Scan { path, source }),
            },
            Ok(None) => {}
            Err(source) => errors.push(JanitorError::Scan { path, source }),
        }
    }

    for error in &errors {
        tracing::warn!("Skipping unreadable entry: {}", error);
    }
    Ok((files, errors))
}

/// Metadata of a regular file, `None` for anything else
fn file_metadata(path: &Path) -> std::io::Result<Option<Metadata>> {
    let meta = fs::symlink_metadata(path)?;
    Ok(meta.file_type().is_file().then_some(meta))
}

/// Result of scanning one directory for archive candidates
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Files past the archiving window, in name order
    pub candidates: Vec<CandidateFile>,

    /// Regular files that passed the file-type filter
    pub scanned: usize,

    /// Per-file metadata failures (skipped, not counted)
    pub errors: Vec<JanitorError>,
}

/// Scan the immediate files of `dir` for archive candidates
///
/// `relative_path` of each candidate is computed against `log_root` so entries keep
/// their place in the log tree.
pub fn scan_directory<F>(
    dir: &Path,
    log_root: &Path,
    classifier: &AgeClassifier,
    accepts: F,
) -> Result<ScanOutcome, JanitorError>
where
    F: Fn(&str) -> bool,
{
    let (files, errors) = list_files(dir)?;
    let mut outcome = ScanOutcome {
        errors,
        ..Default::default()
    };

    for file in files {
        let name = match file.path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => {
                tracing::warn!("Skipping file with non UTF-8 name: {}", file.path.display());
                continue;
            }
        };
        if !accepts(name) {
            continue;
        }
        outcome.scanned += 1;

        let classification = classifier.classify_for_archive(file.modified_epoch);
        let Some(bucket_date) = classification.bucket_date else {
            continue;
        };

        let relative_path = file
            .path
            .strip_prefix(log_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(name));
        outcome.candidates.push(CandidateFile::new(
            file.path,
            relative_path,
            file.modified_epoch,
            classification.age_days,
            bucket_date,
        ));
    }

    Ok(outcome)
}

/// Nested subdirectories of `root`, depth-first in name order
///
/// Symlinked directories are not followed. Any directory in `excluded` (typically the
/// archive base when it lives inside a log root) is skipped along with its subtree.
/// Walk failures are returned as `Directory` errors next to the directories that
/// could be listed.
pub fn list_subdirectories(root: &Path, excluded: &[PathBuf]) -> (Vec<PathBuf>, Vec<JanitorError>) {
    let excluded = resolve_all(excluded);
    let is_excluded = |path: &Path| is_within(path, &excluded);

    let mut dirs = Vec::new();
    let mut errors = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && is_excluded(entry.path())));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                tracing::warn!("Cannot walk {}: {}", path.display(), e);
                errors.push(JanitorError::directory(path, e));
            }
        }
    }

    (dirs, errors)
}

/// Whether `path` is one of `dirs` or lies below one of them
///
/// Both sides are compared after resolving symlinks where the path exists.
pub fn is_within_any(path: &Path, dirs: &[PathBuf]) -> bool {
    is_within(path, &resolve_all(dirs))
}

fn resolve_all(dirs: &[PathBuf]) -> Vec<PathBuf> {
    dirs.iter()
        .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
        .collect()
}

fn is_within(path: &Path, resolved: &[PathBuf]) -> bool {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    resolved.iter().any(|dir| path.starts_with(dir))
}

/// Immediate subdirectories of `dir`, in name order
pub fn list_child_directories(dir: &Path) -> Result<Vec<PathBuf>, JanitorError> {
    let mut dirs = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| JanitorError::directory(dir, e))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}
