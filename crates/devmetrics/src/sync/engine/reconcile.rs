use chrono::Utc;

use crate::platform::HostRepo;
use crate::store::PersistenceGateway;
use crate::vcs::CommitSource;

use super::super::error::{Result, SyncError};
use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::{RepoAction, SyncOptions};
use super::backfill::backfill_repo;

/// Create or refresh one repository.
///
/// A known repository has its snapshot overwritten. A new one is backfilled
/// first and only then inserted, so a failed backfill leaves no repository
/// row and the next run tries again.
pub(super) async fn reconcile_repo<V, G>(
    vcs: &V,
    store: &G,
    repo: &HostRepo,
    group: &str,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<RepoAction>
where
    V: CommitSource,
    G: PersistenceGateway,
{
    let full_name = repo.full_name();

    if let Some(existing) = store.find_repo(&full_name).await? {
        store.update_repo(existing, repo, Utc::now()).await?;
        emit(on_progress, SyncProgress::RepoUpdated { repo: full_name });
        return Ok(RepoAction::Updated);
    }

    let commits = backfill_repo(vcs, store, repo, options, on_progress)
        .await
        .map_err(|source| SyncError::Backfill {
            repo: full_name.clone(),
            source,
        })?;

    store.create_repo(repo, group, Utc::now()).await?;
    emit(
        on_progress,
        SyncProgress::RepoCreated {
            repo: full_name,
            commits,
        },
    );

    Ok(RepoAction::Created { commits })
}
