//! Trait definitions for external interactions
//!
//! The janitor reads sources and removes files only through [`LogFs`], so tests can
//! simulate I/O failures without touching permissions.

use std::io::{self, Read};
use std::path::Path;

/// Content access and removal for log files and bundles
///
/// Implemented by the infrastructure layer (`logkeeper-janitor::LocalFs`)
pub trait LogFs {
    /// Open a file for streaming reads
    ///
    /// Sources are copied into bundles from this reader, so files of any size are
    /// archived without being loaded into memory.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Remove a file
    fn remove(&self, path: &Path) -> io::Result<()>;
}

impl<T: LogFs + ?Sized> LogFs for &T {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        (**self).open(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }
}

impl<T: LogFs + ?Sized> LogFs for Box<T> {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        (**self).open(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }
}
