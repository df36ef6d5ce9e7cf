//! Local filesystem implementation of `LogFs`

use logkeeper_domain::LogFs;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// `LogFs` backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LogFs for LocalFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
