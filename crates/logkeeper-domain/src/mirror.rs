//! PathMirror path computation
//!
//! Maps a log-tree directory to its archive-tree counterpart by stripping the known
//! log root prefix and re-rooting the remainder under `archive_base/basename(root)`.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Errors computing a mirrored directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// The log root has no final path component (e.g. `/`)
    NoBasename(PathBuf),

    /// The subdirectory does not lie under the log root
    NotUnderRoot {
        /// Log root
        root: PathBuf,
        /// Offending subdirectory
        subdir: PathBuf,
    },
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorError::NoBasename(root) => {
                write!(f, "log root {} has no directory name", root.display())
            }
            MirrorError::NotUnderRoot { root, subdir } => write!(
                f,
                "{} is not inside log root {}",
                subdir.display(),
                root.display()
            ),
        }
    }
}

impl std::error::Error for MirrorError {}

/// Drop `.` components and trailing separators
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Relative location of `subdir` inside `log_root`
///
/// A `subdir` that does not start with the root but is itself relative is taken as
/// already relative to the root.
pub fn relative_to_root(log_root: &Path, subdir: &Path) -> Result<PathBuf, MirrorError> {
    let root = normalize(log_root);
    let sub = normalize(subdir);

    let relative = match sub.strip_prefix(&root) {
        Ok(rest) => rest.to_path_buf(),
        Err(_) if sub.is_relative() => sub,
        Err(_) => {
            return Err(MirrorError::NotUnderRoot {
                root: log_root.to_path_buf(),
                subdir: subdir.to_path_buf(),
            })
        }
    };

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(MirrorError::NotUnderRoot {
            root: log_root.to_path_buf(),
            subdir: subdir.to_path_buf(),
        });
    }
    Ok(relative)
}

/// Archive directory mirroring `log_root` (or one of its subdirectories)
///
/// # Examples
///
/// ```
/// use logkeeper_domain::mirrored_dir;
/// use std::path::{Path, PathBuf};
///
/// let base = Path::new("/archives");
/// let root = Path::new("/var/log/app");
///
/// assert_eq!(mirrored_dir(root, base, None).unwrap(), PathBuf::from("/archives/app"));
/// assert_eq!(
///     mirrored_dir(root, base, Some(Path::new("/var/log/app/web/2026"))).unwrap(),
///     PathBuf::from("/archives/app/web/2026"),
/// );
/// ```
pub fn mirrored_dir(
    log_root: &Path,
    archive_base: &Path,
    subdir: Option<&Path>,
) -> Result<PathBuf, MirrorError> {
    let root = normalize(log_root);
    let basename = root
        .file_name()
        .ok_or_else(|| MirrorError::NoBasename(log_root.to_path_buf()))?;

    let mut target = archive_base.join(basename);
    if let Some(subdir) = subdir {
        let relative = relative_to_root(log_root, subdir)?;
        if relative.components().next().is_some() {
            target.push(relative);
        }
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_without_subdir() {
        let dir = mirrored_dir(Path::new("/var/log/nginx"), Path::new("/srv/archives"), None).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/archives/nginx"));
    }

    #[test]
    fn test_trailing_separator_is_ignored() {
        let dir = mirrored_dir(Path::new("/var/log/nginx/"), Path::new("/srv/archives"), None).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/archives/nginx"));
    }

    #[test]
    fn test_nested_subdir() {
        let dir = mirrored_dir(
            Path::new("/var/log/nginx"),
            Path::new("/srv/archives"),
            Some(Path::new("/var/log/nginx/sites/blog")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/archives/nginx/sites/blog"));
    }

    #[test]
    fn test_relative_subdir_is_rooted() {
        let dir = mirrored_dir(
            Path::new("/var/log/nginx"),
            Path::new("/srv/archives"),
            Some(Path::new("sites")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/archives/nginx/sites"));
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_rejected() {
        let err = mirrored_dir(
            Path::new("/var/log/nginx"),
            Path::new("/srv/archives"),
            Some(Path::new("/var/log/nginx-old/x")),
        )
        .unwrap_err();
        assert!(matches!(err, MirrorError::NotUnderRoot { .. }));
    }

    #[test]
    fn test_escaping_relative_subdir_is_rejected() {
        let err = relative_to_root(Path::new("/var/log/nginx"), Path::new("../etc")).unwrap_err();
        assert!(matches!(err, MirrorError::NotUnderRoot { .. }));
    }

    #[test]
    fn test_relative_root_with_joined_subdir() {
        let dir = mirrored_dir(Path::new("logs"), Path::new("/a"), Some(Path::new("logs/web"))).unwrap();
        assert_eq!(dir, PathBuf::from("/a/logs/web"));
    }

    #[test]
    fn test_subdir_equal_to_root() {
        let dir = mirrored_dir(Path::new("/l/app"), Path::new("/a"), Some(Path::new("/l/app"))).unwrap();
        assert_eq!(dir, PathBuf::from("/a/app"));
    }

    #[test]
    fn test_root_has_no_basename() {
        let err = mirrored_dir(Path::new("/"), Path::new("/srv/archives"), None).unwrap_err();
        assert!(matches!(err, MirrorError::NoBasename(_)));
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let a = mirrored_dir(Path::new("/l/app"), Path::new("/a"), Some(Path::new("/l/app/x"))).unwrap();
        let b = mirrored_dir(Path::new("/l/app"), Path::new("/a"), Some(Path::new("/l/app/x"))).unwrap();
        assert_eq!(a, b);
    }
}
