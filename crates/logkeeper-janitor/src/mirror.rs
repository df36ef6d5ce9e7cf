//! Archive directory resolution and creation

use crate::JanitorError;
use logkeeper_domain::mirrored_dir;
use std::fs;
use std::path::{Path, PathBuf};

/// Maps log directories onto the archive tree rooted at `archive_base`
#[derive(Debug, Clone)]
pub struct PathMirror {
    archive_base: PathBuf,
}

impl PathMirror {
    /// Create a mirror for the given archive base
    pub fn new(archive_base: impl Into<PathBuf>) -> Self {
        Self {
            archive_base: archive_base.into(),
        }
    }

    /// The archive base directory
    pub fn archive_base(&self) -> &Path {
        &self.archive_base
    }

    /// Compute the mirrored directory without touching the filesystem
    pub fn resolve(&self, log_root: &Path, subdir: Option<&Path>) -> Result<PathBuf, JanitorError> {
        mirrored_dir(log_root, &self.archive_base, subdir)
            .map_err(|e| JanitorError::directory(subdir.unwrap_or(log_root), e))
    }

    /// Compute the mirrored directory and create it (with parents) if missing
    pub fn ensure(&self, log_root: &Path, subdir: Option<&Path>) -> Result<PathBuf, JanitorError> {
        let target = self.resolve(log_root, subdir)?;
        fs::create_dir_all(&target).map_err(|e| JanitorError::directory(&target, e))?;
        Ok(target)
    }
}
