use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use tempfile::TempDir;

use crate::platform::HostRepo;
use crate::store::{CommitRecord, PersistenceGateway};
use crate::vcs::{CommitSource, LogEntry};

use super::super::error::BackfillError;
use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::{Ineligible, SyncOptions};

/// Prefix for backfill scratch directories.
const WORKDIR_PREFIX: &str = "devmetrics-";

/// Check whether a new repository should have its history backfilled.
pub(super) fn check_eligibility(repo: &HostRepo, cutoff_year: i32) -> Result<(), Ineligible> {
    if repo.fork {
        return Err(Ineligible::Fork);
    }
    if repo.size == 0 {
        return Err(Ineligible::Empty);
    }
    let year = repo
        .created_at
        .map(|t| t.year())
        .ok_or(Ineligible::UnknownCreation)?;
    if year > cutoff_year {
        return Err(Ineligible::TooRecent { year });
    }
    Ok(())
}

#[inline]
pub(super) fn before_horizon(at: DateTime<Utc>, horizon_year: i32) -> bool {
    at.year() < horizon_year
}

pub(super) fn to_commit_record(entry: LogEntry, repo: &str) -> CommitRecord {
    CommitRecord {
        repo: repo.to_string(),
        hash: entry.hash,
        author_name: entry.author_name,
        author_email: entry.author_email,
        committer_name: entry.committer_name,
        committer_email: entry.committer_email,
        created_at: entry.authored_at,
        message: entry.message,
    }
}

fn allocate_workdir(base: Option<&Path>) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(WORKDIR_PREFIX);
    match base {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            builder.tempdir_in(dir)
        }
        None => builder.tempdir(),
    }
}

fn release_workdir(workdir: TempDir) {
    let path = workdir.path().to_path_buf();
    if let Err(e) = workdir.close() {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove backfill working directory"
        );
    }
}

/// Clone a new repository and store its pre-horizon commits.
///
/// Returns the number of commit rows inserted. Ineligible repositories are a
/// no-op. The scratch directory is removed on every path: explicitly on
/// success, by drop on error.
pub(super) async fn backfill_repo<V, G>(
    vcs: &V,
    store: &G,
    repo: &HostRepo,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<usize, BackfillError>
where
    V: CommitSource,
    G: PersistenceGateway,
{
    let full_name = repo.full_name();

    if let Err(reason) = check_eligibility(repo, options.backfill_cutoff_year) {
        tracing::debug!(repo = %full_name, %reason, "Skipping backfill");
        emit(
            on_progress,
            SyncProgress::BackfillSkipped {
                repo: full_name,
                reason,
            },
        );
        return Ok(0);
    }

    let url = options
        .clone_transport
        .url_for(repo)
        .ok_or_else(|| BackfillError::MissingUrl {
            repo: full_name.clone(),
            transport: options.clone_transport.to_string(),
        })?;

    let workdir = allocate_workdir(options.workdir.as_deref())?;
    let checkout = workdir.path().join(&repo.name);

    emit(
        on_progress,
        SyncProgress::BackfillStarted {
            repo: full_name.clone(),
            url: url.to_string(),
        },
    );

    vcs.clone_repo(url, &checkout).await?;
    let log = vcs.read_log(&checkout, options.max_log_entries).await?;
    let extracted = log.len();

    let mut kept = 0;
    let mut inserted = 0;
    for entry in log {
        if !before_horizon(entry.authored_at, options.commit_horizon_year) {
            continue;
        }
        kept += 1;
        if store
            .append_commit(&to_commit_record(entry, &full_name))
            .await?
        {
            inserted += 1;
        }
    }

    release_workdir(workdir);

    emit(
        on_progress,
        SyncProgress::BackfillComplete {
            repo: full_name,
            extracted,
            kept,
            inserted,
        },
    );

    Ok(inserted)
}
