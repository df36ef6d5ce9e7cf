//! Bundle keys and entry naming
//!
//! A bundle is one zip per (target directory, calendar date). Entries inside it are
//! bundle-root-relative: `<date>/<path relative to the log root>`.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Extension of every bundle file
pub const BUNDLE_EXTENSION: &str = "zip";

/// Identifies one archive bundle
///
/// Two files with the same modification date in the same logical directory always map
/// to the same key, no matter how many scan passes produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleKey {
    /// Archive directory holding the bundle
    pub directory: PathBuf,

    /// Calendar date (`DD-MM-YYYY`)
    pub date: String,
}

impl BundleKey {
    /// Create a key
    pub fn new(directory: impl Into<PathBuf>, date: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            date: date.into(),
        }
    }

    /// Bundle file name, e.g. `10-06-2026.zip`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.date, BUNDLE_EXTENSION)
    }

    /// Bundle location inside `archive_dir`
    ///
    /// The grouping directory is the logical key; the writer decides where the file
    /// physically lands.
    pub fn bundle_path_in(&self, archive_dir: &Path) -> PathBuf {
        archive_dir.join(self.file_name())
    }

    /// Entry name for a file, given its path relative to the log root
    ///
    /// # Examples
    ///
    /// ```
    /// use logkeeper_domain::BundleKey;
    /// use std::path::Path;
    ///
    /// let key = BundleKey::new("/archives/app", "05-10-2026");
    /// assert_eq!(key.entry_name(Path::new("web/access.log")), "05-10-2026/web/access.log");
    /// ```
    pub fn entry_name(&self, relative_path: &Path) -> String {
        let mut name = self.date.clone();
        for component in relative_path.components() {
            if let Component::Normal(part) = component {
                name.push('/');
                name.push_str(&part.to_string_lossy());
            }
        }
        name
    }
}

/// First free variant of `name` among `taken`
///
/// Returns `name` itself when free, otherwise `name.1`, `name.2`, ...
pub fn dedup_entry_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{}.{}", name, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
