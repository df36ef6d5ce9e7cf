//! Per-directory tallies

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Tally for one directory (or an aggregate of several)
///
/// `total` counts candidates seen; every candidate ends up in exactly one of
/// `succeeded`, `failed` or `skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    /// Candidates seen
    pub total: usize,

    /// Candidates archived (source removed) or deleted
    pub succeeded: usize,

    /// Candidates whose write or delete failed; sources are left in place
    pub failed: usize,

    /// Candidates left untouched (dry run or cancelled run)
    #[serde(default)]
    pub skipped: usize,

    /// Bundles that did not exist before this run
    #[serde(default)]
    pub bundles_created: usize,
}

impl RunCounts {
    /// Create zeroed counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: &RunCounts) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.bundles_created += other.bundles_created;
    }

    /// No failures recorded
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Every candidate has been accounted for
    pub fn is_balanced(&self) -> bool {
        self.succeeded + self.failed + self.skipped == self.total
    }
}

impl AddAssign for RunCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut a = RunCounts {
            total: 3,
            succeeded: 2,
            failed: 1,
            skipped: 0,
            bundles_created: 1,
        };
        a += RunCounts {
            total: 2,
            succeeded: 1,
            failed: 0,
            skipped: 1,
            bundles_created: 0,
        };

        assert_eq!(a.total, 5);
        assert_eq!(a.succeeded, 3);
        assert_eq!(a.failed, 1);
        assert_eq!(a.skipped, 1);
        assert_eq!(a.bundles_created, 1);
        assert!(a.is_balanced());
        assert!(!a.is_clean());
    }

    #[test]
    fn test_default_is_clean_and_balanced() {
        let counts = RunCounts::new();
        assert!(counts.is_clean());
        assert!(counts.is_balanced());
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let counts: RunCounts =
            serde_json::from_str(r#"{"total":1,"succeeded":1,"failed":0}"#).unwrap();
        assert_eq!(counts.skipped, 0);
        assert_eq!(counts.bundles_created, 0);
    }
}
