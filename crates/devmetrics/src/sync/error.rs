use thiserror::Error;

use crate::platform::HostError;
use crate::store::StoreError;
use crate::vcs::VcsError;

/// Errors from the commit backfill pipeline.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// Creating the scratch checkout directory failed.
    #[error("Working directory error: {0}")]
    Workdir(#[from] std::io::Error),

    #[error("No {transport} URL for {repo}")]
    MissingUrl { repo: String, transport: String },

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("Failed to store commit: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while processing one owner.
///
/// None of these escape the owner coordinator: they become
/// [`OwnerOutcome::Failed`](super::OwnerOutcome::Failed).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Organization probe failed. The owner is treated as an individual.
    #[error("Probe of {owner} failed: {source}")]
    Probe {
        owner: String,
        #[source]
        source: HostError,
    },

    #[error("Failed to list repositories for {owner}: {source}")]
    Fetch {
        owner: String,
        #[source]
        source: HostError,
    },

    #[error("Backfill of {repo} failed: {source}")]
    Backfill {
        repo: String,
        #[source]
        source: BackfillError,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
