//! Run phases - the whole-run state machine

/// Phase of a housekeeping run
///
/// A run moves strictly forward:
/// `Idle -> ScanningArchive -> WritingArchive -> ScanningDeletion -> Deleting -> Reporting -> Idle`.
/// The archive phase completes for every configured root before any deletion scan
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunPhase {
    /// No run in progress
    #[default]
    Idle,

    /// Classifying log files against the archiving window
    ScanningArchive,

    /// Committing bundles and removing archived sources
    WritingArchive,

    /// Classifying bundles against the deletion window
    ScanningDeletion,

    /// Removing expired bundles
    Deleting,

    /// Assembling and writing the run summary
    Reporting,
}

impl RunPhase {
    /// Phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::ScanningArchive => "scanning-archive",
            RunPhase::WritingArchive => "writing-archive",
            RunPhase::ScanningDeletion => "scanning-deletion",
            RunPhase::Deleting => "deleting",
            RunPhase::Reporting => "reporting",
        }
    }

    /// The phase that follows this one
    pub fn next(&self) -> Self {
        match self {
            RunPhase::Idle => RunPhase::ScanningArchive,
            RunPhase::ScanningArchive => RunPhase::WritingArchive,
            RunPhase::WritingArchive => RunPhase::ScanningDeletion,
            RunPhase::ScanningDeletion => RunPhase::Deleting,
            RunPhase::Deleting => RunPhase::Reporting,
            RunPhase::Reporting => RunPhase::Idle,
        }
    }

    /// Whether `to` is a legal transition from this phase
    ///
    /// Besides stepping forward, scanning and writing alternate per directory
    /// within each of the two phases.
    pub fn can_transition_to(&self, to: RunPhase) -> bool {
        to == self.next()
            || matches!(
                (self, to),
                (RunPhase::WritingArchive, RunPhase::ScanningArchive)
                    | (RunPhase::Deleting, RunPhase::ScanningDeletion)
            )
    }

    /// Archive phase (scan or write)
    pub fn is_archive_phase(&self) -> bool {
        matches!(self, RunPhase::ScanningArchive | RunPhase::WritingArchive)
    }

    /// Deletion phase (scan or delete)
    pub fn is_deletion_phase(&self) -> bool {
        matches!(self, RunPhase::ScanningDeletion | RunPhase::Deleting)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
