//! Progress events for sync runs.
//!
//! The engine reports what it is doing through an optional callback. The CLI
//! turns these into log lines or a progress bar.

use std::time::Duration;

use super::types::{Ineligible, OwnerSyncStats, SkipReason};

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Batch planned.
    BatchStarted {
        /// Number of owner jobs in the batch.
        total: usize,
    },

    /// Starting work on an owner.
    OwnerStarted { owner: String },

    /// Owner skipped without any writes.
    OwnerSkipped { owner: String, reason: SkipReason },

    /// The organization probe failed; the owner is treated as an individual.
    ProbeFailed { owner: String, error: String },

    /// Starting to page through an owner's repositories.
    FetchingRepos {
        owner: String,
        per_page: u32,
        first_fetch: bool,
    },

    /// Fetched a page of repositories.
    FetchedPage {
        owner: String,
        /// Page number (1-indexed).
        page: u32,
        /// Number of repos on this page.
        count: usize,
        /// Running total of repos fetched so far.
        total_so_far: usize,
    },

    /// Finished paging.
    FetchComplete {
        owner: String,
        /// Repositories fetched before allowlist filtering.
        total: usize,
        pages: u32,
    },

    /// Backfill skipped for a new repository.
    BackfillSkipped {
        repo: String,
        reason: Ineligible,
    },

    /// Cloning a new repository for backfill.
    BackfillStarted { repo: String, url: String },

    /// Backfill finished.
    BackfillComplete {
        repo: String,
        /// Log entries read.
        extracted: usize,
        /// Entries before the horizon year.
        kept: usize,
        /// Rows actually inserted.
        inserted: usize,
    },

    /// New repository stored.
    RepoCreated { repo: String, commits: usize },

    /// Known repository refreshed.
    RepoUpdated { repo: String },

    /// Owner fully processed.
    OwnerSynced {
        owner: String,
        stats: OwnerSyncStats,
    },

    /// Owner processing failed.
    OwnerFailed { owner: String, error: String },

    /// Sleeping before the next owner.
    Pacing { owner: String, delay: Duration },

    /// One job of the batch is done, whatever its outcome.
    OwnerDone {
        owner: String,
        done: usize,
        total: usize,
    },

    /// Batch finished.
    BatchComplete {
        synced: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
