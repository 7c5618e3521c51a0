use devmetrics::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::BatchStarted { total } => {
                tracing::info!(total, "Starting sync batch");
            }

            SyncProgress::OwnerStarted { owner } => {
                tracing::debug!(owner = %owner, "Syncing owner");
            }

            SyncProgress::OwnerSkipped { owner, reason } => {
                tracing::info!(owner = %owner, reason = %reason, "Skipped owner");
            }

            SyncProgress::ProbeFailed { owner, error } => {
                tracing::debug!(owner = %owner, error = %error, "Not an organization, treating as user");
            }

            SyncProgress::FetchingRepos {
                owner,
                per_page,
                first_fetch,
            } => {
                tracing::info!(owner = %owner, per_page, first_fetch, "Fetching repositories");
            }

            SyncProgress::FetchedPage {
                owner,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(owner = %owner, page, count, total_so_far, "Fetched page");
            }

            SyncProgress::FetchComplete {
                owner,
                total,
                pages,
            } => {
                tracing::info!(owner = %owner, total, pages, "Fetch complete");
            }

            SyncProgress::BackfillSkipped { repo, reason } => {
                tracing::debug!(repo = %repo, reason = %reason, "Not backfilling");
            }

            SyncProgress::BackfillStarted { repo, url } => {
                tracing::info!(repo = %repo, url = %url, "Cloning for backfill");
            }

            SyncProgress::BackfillComplete {
                repo,
                extracted,
                kept,
                inserted,
            } => {
                tracing::info!(repo = %repo, extracted, kept, inserted, "Backfill complete");
            }

            SyncProgress::RepoCreated { repo, commits } => {
                tracing::info!(repo = %repo, commits, "Created repository");
            }

            SyncProgress::RepoUpdated { repo } => {
                tracing::debug!(repo = %repo, "Updated repository");
            }

            SyncProgress::OwnerSynced { owner, stats } => {
                tracing::info!(
                    owner = %owner,
                    kind = ?stats.kind,
                    pages = stats.pages,
                    discovered = stats.discovered,
                    created = stats.created,
                    updated = stats.updated,
                    commits = stats.commits,
                    "Owner synced"
                );
            }

            SyncProgress::OwnerFailed { owner, error } => {
                tracing::warn!(owner = %owner, error = %error, "Owner failed");
            }

            SyncProgress::Pacing { owner, delay } => {
                tracing::debug!(owner = %owner, delay = ?delay, "Pacing");
            }

            SyncProgress::OwnerDone { owner, done, total } => {
                tracing::info!(
                    owner = %owner,
                    "done {}/{} ({:.1}%)",
                    done,
                    total,
                    percent(done, total)
                );
            }

            SyncProgress::BatchComplete {
                synced,
                skipped,
                failed,
            } => {
                tracing::info!(synced, skipped, failed, "Sync complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 * 100.0 / total as f64
    }
}
