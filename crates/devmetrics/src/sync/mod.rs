//! Incremental owner/repository sync with commit backfill.
//!
//! # Module Structure
//!
//! - [`types`] - Options, targets and outcomes: `SyncOptions`, `SyncTargets`, `SyncTally`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - The `Synchronizer`: owner refresh and batch driver
//!
//! # Example
//!
//! ```ignore
//! use devmetrics::sync::{SyncOptions, SyncTargets, Synchronizer};
//!
//! let engine = Synchronizer::new(host, vcs, db, SyncOptions::default());
//! let tally = engine.run(&SyncTargets::new(["acme"], ["zeta/lib"])).await;
//! for (owner, reason) in &tally.failures {
//!     eprintln!("{owner}: {reason}");
//! }
//! ```

pub mod engine;
mod error;
mod progress;
mod types;

pub use engine::Synchronizer;
pub use error::{BackfillError, Result, SyncError};
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use types::{
    CloneTransport, Ineligible, OwnerJob, OwnerOutcome, OwnerSyncStats, RepoAction, SkipReason,
    SyncOptions, SyncTally, SyncTargets,
};

// Re-export defaults
pub use types::{
    DEFAULT_BACKFILL_CUTOFF_YEAR, DEFAULT_COMMIT_HORIZON_YEAR, DEFAULT_FIRST_PAGE_SIZE,
    DEFAULT_FRESHNESS_DAYS, DEFAULT_MAX_LOG_ENTRIES, DEFAULT_PACE, DEFAULT_REFRESH_PAGE_SIZE,
    DEFAULT_UNREACHABLE_OWNERS, MAX_PAGE_SIZE,
};
