//! ArchiveGrouper: buckets candidates into bundles

use crate::{BundleKey, CandidateFile};
use std::collections::HashMap;
use std::path::Path;

/// Candidates grouped by bundle key, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleGroups {
    groups: Vec<(BundleKey, Vec<CandidateFile>)>,
    index: HashMap<BundleKey, usize>,
}

impl BundleGroups {
    /// Create an empty grouping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate to the group for `key`, opening the group if needed
    pub fn push(&mut self, key: BundleKey, candidate: CandidateFile) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(candidate),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![candidate]));
            }
        }
    }

    /// Number of bundles
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no bundles
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total candidates across all bundles
    pub fn candidate_count(&self) -> usize {
        self.groups.iter().map(|(_, files)| files.len()).sum()
    }

    /// Bundle keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &BundleKey> {
        self.groups.iter().map(|(key, _)| key)
    }

    /// Members of one bundle
    pub fn get(&self, key: &BundleKey) -> Option<&[CandidateFile]> {
        self.index.get(key).map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Iterate over (key, members) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&BundleKey, &[CandidateFile])> {
        self.groups.iter().map(|(key, files)| (key, files.as_slice()))
    }
}

impl IntoIterator for BundleGroups {
    type Item = (BundleKey, Vec<CandidateFile>);
    type IntoIter = std::vec::IntoIter<(BundleKey, Vec<CandidateFile>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group candidates of one directory by bundle date
///
/// Keys appear in order of first occurrence and each group keeps discovery order.
///
/// # Examples
///
/// ```
/// use logkeeper_domain::{group, CandidateFile};
/// use std::path::Path;
///
/// let files = vec![
///     CandidateFile::new("/logs/a.log", "a.log", 0.0, 10.0, "01-01-2026"),
///     CandidateFile::new("/logs/b.log", "b.log", 0.0, 12.0, "30-12-2025"),
///     CandidateFile::new("/logs/c.log", "c.log", 0.0, 10.0, "01-01-2026"),
/// ];
/// let groups = group(files, Path::new("/logs"));
///
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups.candidate_count(), 3);
/// ```
pub fn group(candidates: Vec<CandidateFile>, directory: &Path) -> BundleGroups {
    let mut groups = BundleGroups::new();
    for candidate in candidates {
        let key = BundleKey::new(directory, candidate.bucket_date.clone());
        groups.push(key, candidate);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, date: &str) -> CandidateFile {
        CandidateFile::new(format!("/logs/{}", name), name, 0.0, 10.0, date)
    }

    #[test]
    fn test_empty_input() {
        let groups = group(Vec::new(), Path::new("/logs"));
        assert!(groups.is_empty());
        assert_eq!(groups.candidate_count(), 0);
    }

    #[test]
    fn test_keys_in_first_occurrence_order() {
        let groups = group(
            vec![
                candidate("a.log", "02-01-2026"),
                candidate("b.log", "01-01-2026"),
                candidate("c.log", "02-01-2026"),
            ],
            Path::new("/logs"),
        );

        let dates: Vec<&str> = groups.keys().map(|k| k.date.as_str()).collect();
        assert_eq!(dates, vec!["02-01-2026", "01-01-2026"]);
    }

    #[test]
    fn test_members_keep_discovery_order() {
        let groups = group(
            vec![
                candidate("z.log", "02-01-2026"),
                candidate("a.log", "02-01-2026"),
            ],
            Path::new("/logs"),
        );

        let key = BundleKey::new("/logs", "02-01-2026");
        let names: Vec<&str> = groups
            .get(&key)
            .unwrap()
            .iter()
            .filter_map(|c| c.file_name())
            .collect();
        assert_eq!(names, vec!["z.log", "a.log"]);
    }

    #[test]
    fn test_keys_carry_directory() {
        let groups = group(vec![candidate("a.log", "02-01-2026")], Path::new("/logs/web"));
        let key = groups.keys().next().unwrap();
        assert_eq!(key.directory, Path::new("/logs/web"));
    }
}
