//! logkeeper Domain Layer
//!
//! This crate contains the pure classification and grouping logic behind logkeeper's
//! log housekeeping. It performs no filesystem I/O of its own: everything that touches
//! the disk goes through the [`traits::LogFs`] seam or lives in `logkeeper-janitor`.
//!
//! ## Key Concepts
//!
//! - **Archiving window**: minimum age (days) before a log file is bundled
//! - **Deletion window**: minimum age (days) before a bundle is removed
//! - **Candidate**: a file that crossed the relevant window
//! - **Bundle**: one `DD-MM-YYYY.zip` per (directory, modification date)
//! - **Mirrored directory**: the archive-tree directory matching a log-tree directory
//!
//! ## Pipeline
//!
//! ```text
//! AgeClassifier -> ArchiveGrouper -> ArchiveWriter   (archive phase)
//! AgeClassifier -> RetentionSweeper                  (deletion phase)
//! ```
//!
//! The writer and sweeper live in `logkeeper-janitor`; this crate owns the decisions
//! they act on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod age;
pub mod bundle;
pub mod candidate;
pub mod counts;
pub mod grouping;
pub mod mirror;
pub mod phase;
pub mod traits;

// Re-exports for convenience
pub use age::{AgeClassifier, Classification};
pub use bundle::BundleKey;
pub use candidate::CandidateFile;
pub use counts::RunCounts;
pub use grouping::{group, BundleGroups};
pub use mirror::{mirrored_dir, MirrorError};
pub use phase::RunPhase;
pub use traits::LogFs;
