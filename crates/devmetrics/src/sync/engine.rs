//! Incremental owner sync engine.
//!
//! [`Synchronizer`] ties a [`SourceHost`], a [`CommitSource`] and a
//! [`PersistenceGateway`] together. For each owner it decides whether work is
//! needed, pages through the owner's repositories, creates or refreshes each
//! one (backfilling history for old repositories seen for the first time),
//! and finally records the owner as processed.
//!
//! Owners are processed strictly one after another. Every error is caught at
//! the owner boundary, so a batch always runs to completion.
//!
//! # Example
//!
//! ```ignore
//! use devmetrics::sync::{SyncOptions, SyncTargets, Synchronizer};
//! use devmetrics::vcs::Git2CommitSource;
//!
//! let engine = Synchronizer::new(host, Git2CommitSource::new(), db, SyncOptions::default());
//! let outcome = engine.refresh_owner("acme", None).await;
//! ```

mod backfill;
mod discover;
mod pacing;
mod reconcile;

use std::sync::Arc;

use chrono::Utc;

use super::error::{Result, SyncError};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{OwnerOutcome, OwnerSyncStats, SkipReason, SyncOptions, SyncTally, SyncTargets};
use crate::platform::{OwnerKind, SourceHost, short_error_message};
use crate::store::PersistenceGateway;
use crate::vcs::CommitSource;

use discover::{apply_allowlist, discover_repos};
use reconcile::reconcile_repo;

/// Sync engine over a source host, a commit source and a store.
pub struct Synchronizer<H, V, G> {
    host: H,
    vcs: V,
    store: G,
    options: SyncOptions,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl<H, V, G> Synchronizer<H, V, G>
where
    H: SourceHost,
    V: CommitSource,
    G: PersistenceGateway,
{
    pub fn new(host: H, vcs: V, store: G, options: SyncOptions) -> Self {
        Self {
            host,
            vcs,
            store,
            options,
            on_progress: None,
        }
    }

    /// Report progress events to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<ProgressCallback>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    fn progress(&self) -> Option<&ProgressCallback> {
        self.on_progress.as_deref()
    }

    /// Process every owner job derived from `targets`.
    ///
    /// Never aborts early: failed owners are recorded in the tally.
    pub async fn run(&self, targets: &SyncTargets) -> SyncTally {
        let jobs = targets.plan();
        let total = jobs.len();
        let mut tally = SyncTally::default();

        emit(self.progress(), SyncProgress::BatchStarted { total });

        for (i, job) in jobs.iter().enumerate() {
            let outcome = self
                .refresh_owner(&job.owner, job.allowlist.as_deref())
                .await;
            tally.record(&job.owner, &outcome);

            emit(
                self.progress(),
                SyncProgress::OwnerDone {
                    owner: job.owner.clone(),
                    done: i + 1,
                    total,
                },
            );
        }

        emit(
            self.progress(),
            SyncProgress::BatchComplete {
                synced: tally.synced,
                skipped: tally.skipped,
                failed: tally.failed,
            },
        );

        tally
    }

    /// Bring one owner up to date.
    ///
    /// With an `allowlist`, only the named repositories ("owner/name") are
    /// reconciled. Successful owners are followed by the configured pacing
    /// delay.
    pub async fn refresh_owner(&self, owner: &str, allowlist: Option<&[String]>) -> OwnerOutcome {
        let on_progress = self.progress();

        if self.options.is_unreachable(owner) {
            emit(
                on_progress,
                SyncProgress::OwnerSkipped {
                    owner: owner.to_string(),
                    reason: SkipReason::Unreachable,
                },
            );
            return OwnerOutcome::Skipped(SkipReason::Unreachable);
        }

        emit(
            on_progress,
            SyncProgress::OwnerStarted {
                owner: owner.to_string(),
            },
        );

        match self.sync_owner(owner, allowlist).await {
            Ok(None) => {
                emit(
                    on_progress,
                    SyncProgress::OwnerSkipped {
                        owner: owner.to_string(),
                        reason: SkipReason::Fresh,
                    },
                );
                OwnerOutcome::Skipped(SkipReason::Fresh)
            }
            Ok(Some(stats)) => {
                emit(
                    on_progress,
                    SyncProgress::OwnerSynced {
                        owner: owner.to_string(),
                        stats: stats.clone(),
                    },
                );
                pacing::pace(owner, self.options.pace, on_progress).await;
                OwnerOutcome::Synced(stats)
            }
            Err(e) => {
                tracing::warn!(owner, error = %e, "Owner sync failed");
                let reason = short_error_message(&e);
                emit(
                    on_progress,
                    SyncProgress::OwnerFailed {
                        owner: owner.to_string(),
                        error: reason.clone(),
                    },
                );
                OwnerOutcome::Failed { reason }
            }
        }
    }

    /// Returns `None` when the owner is still fresh.
    async fn sync_owner(
        &self,
        owner: &str,
        allowlist: Option<&[String]>,
    ) -> Result<Option<OwnerSyncStats>> {
        let on_progress = self.progress();
        let stored = self.store.find_owner(owner).await?;

        if let Some(existing) = &stored
            && existing.is_fresh(Utc::now(), self.options.freshness)
        {
            return Ok(None);
        }

        let first_fetch = stored.is_none();
        let kind = match &stored {
            Some(existing) => OwnerKind::from_is_org(existing.is_org),
            None => self.classify(owner).await,
        };
        let since = stored
            .as_ref()
            .map(|existing| existing.last_update_time.with_timezone(&Utc));

        let discovered = discover_repos(
            &self.host,
            owner,
            kind,
            since,
            self.options.page_size(first_fetch),
            on_progress,
        )
        .await?;
        let repos = apply_allowlist(discovered.repos, allowlist);

        let mut stats = OwnerSyncStats::new(kind, first_fetch);
        stats.pages = discovered.pages;
        stats.discovered = repos.len();

        for repo in &repos {
            let action =
                reconcile_repo(&self.vcs, &self.store, repo, owner, &self.options, on_progress)
                    .await?;
            stats.record(action);
        }

        let now = Utc::now();
        match stored {
            Some(existing) => self.store.update_owner(existing, now).await?,
            None => self.store.create_owner(owner, kind, now).await?,
        };

        Ok(Some(stats))
    }

    /// Probe an unknown owner. Any probe failure means "individual".
    async fn classify(&self, owner: &str) -> OwnerKind {
        match self.host.probe_org(owner).await {
            Ok(info) => {
                tracing::debug!(
                    org = %info.name,
                    public_repos = info.public_repos,
                    "Owner is an organization"
                );
                OwnerKind::Organization
            }
            Err(source) => {
                let err = SyncError::Probe {
                    owner: owner.to_string(),
                    source,
                };
                tracing::debug!(error = %err, "Treating owner as an individual");
                emit(
                    self.progress(),
                    SyncProgress::ProbeFailed {
                        owner: owner.to_string(),
                        error: short_error_message(&err),
                    },
                );
                OwnerKind::Individual
            }
        }
    }
}
