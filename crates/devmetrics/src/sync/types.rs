//! Sync options, targets and outcomes.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::platform::{HostRepo, OwnerKind};

/// Owners processed within this many days are skipped.
pub const DEFAULT_FRESHNESS_DAYS: i64 = 7;

/// Page size for an owner that has never been synced.
pub const DEFAULT_FIRST_PAGE_SIZE: u32 = 99;

/// Page size when refreshing a known owner.
pub const DEFAULT_REFRESH_PAGE_SIZE: u32 = 25;

/// GitHub serves at most this many repositories per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Repositories created after this year are never backfilled.
pub const DEFAULT_BACKFILL_CUTOFF_YEAR: i32 = 2014;

/// Only commits authored before this year are stored.
pub const DEFAULT_COMMIT_HORIZON_YEAR: i32 = 2020;

/// Delay after each synced owner: 1/15 of a minute.
pub const DEFAULT_PACE: StdDuration = StdDuration::from_secs(4);

/// Upper bound on commit log entries read per repository.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 1_000_000;

/// Accounts that are known to fail upstream and are never requested.
pub const DEFAULT_UNREACHABLE_OWNERS: [&str; 2] = ["ferum-dex", "Arbi-s"];

/// Which repository URL backfill clones through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneTransport {
    /// `clone_url`; works without credentials for public repositories.
    #[default]
    Https,
    /// `ssh_url`; authenticates through ssh-agent.
    Ssh,
}

impl CloneTransport {
    /// Pick the matching URL from a snapshot.
    pub fn url_for(self, repo: &HostRepo) -> Option<&str> {
        match self {
            Self::Https => repo.clone_url.as_deref(),
            Self::Ssh => repo.ssh_url.as_deref(),
        }
    }
}

impl std::fmt::Display for CloneTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::Ssh => write!(f, "ssh"),
        }
    }
}

/// Tunables for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Owners processed within this window are skipped.
    pub freshness: Duration,
    /// Page size for a first-ever fetch.
    pub first_page_size: u32,
    /// Page size for a refresh.
    pub refresh_page_size: u32,
    /// Latest creation year (UTC) eligible for backfill.
    pub backfill_cutoff_year: i32,
    /// Commits authored in or after this year are dropped.
    pub commit_horizon_year: i32,
    /// Sleep after each successfully synced owner. Zero disables pacing.
    pub pace: StdDuration,
    /// Maximum commit log entries read per repository.
    pub max_log_entries: usize,
    /// Owners that are skipped without any upstream request.
    pub unreachable_owners: HashSet<String>,
    /// URL used for backfill clones.
    pub clone_transport: CloneTransport,
    /// Parent directory for backfill checkouts (system temp dir if unset).
    pub workdir: Option<PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            freshness: Duration::days(DEFAULT_FRESHNESS_DAYS),
            first_page_size: DEFAULT_FIRST_PAGE_SIZE,
            refresh_page_size: DEFAULT_REFRESH_PAGE_SIZE,
            backfill_cutoff_year: DEFAULT_BACKFILL_CUTOFF_YEAR,
            commit_horizon_year: DEFAULT_COMMIT_HORIZON_YEAR,
            pace: DEFAULT_PACE,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
            unreachable_owners: DEFAULT_UNREACHABLE_OWNERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            clone_transport: CloneTransport::default(),
            workdir: None,
        }
    }
}

impl SyncOptions {
    #[inline]
    pub fn is_unreachable(&self, owner: &str) -> bool {
        self.unreachable_owners.contains(owner)
    }

    /// Page size for discovery; a refresh uses the smaller page.
    ///
    /// Clamped to what the host serves per page.
    pub fn page_size(&self, first_fetch: bool) -> u32 {
        let size = if first_fetch {
            self.first_page_size
        } else {
            self.refresh_page_size
        };
        size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// The owners and repositories a run should cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncTargets {
    /// Owners synced in full.
    pub owners: Vec<String>,
    /// Individual repositories ("owner/name") whose owner isn't synced in full.
    pub repos: Vec<String>,
}

/// One unit of work for the batch driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerJob {
    pub owner: String,
    /// Restrict the owner's repositories to these full names.
    pub allowlist: Option<Vec<String>>,
}

impl SyncTargets {
    pub fn new<O, R>(owners: O, repos: R) -> Self
    where
        O: IntoIterator,
        O::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            owners: owners.into_iter().map(Into::into).collect(),
            repos: repos.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.repos.is_empty()
    }

    /// Expand targets into the ordered list of owner jobs.
    ///
    /// Target owners come first, deduplicated in the order given. Target
    /// repositories whose owner is already a target owner are covered by that
    /// owner's full sync. The rest are grouped by owner segment (sorted) and
    /// become allowlisted jobs. Entries without an `owner/name` shape are
    /// dropped.
    pub fn plan(&self) -> Vec<OwnerJob> {
        let mut seen = HashSet::new();
        let mut jobs: Vec<OwnerJob> = self
            .owners
            .iter()
            .filter(|owner| !owner.is_empty() && seen.insert(owner.as_str()))
            .map(|owner| OwnerJob {
                owner: owner.clone(),
                allowlist: None,
            })
            .collect();

        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for full_name in &self.repos {
            let Some((owner, name)) = full_name.split_once('/') else {
                tracing::warn!(repo = %full_name, "Ignoring target repository without owner segment");
                continue;
            };
            if owner.is_empty() || name.is_empty() || seen.contains(owner) {
                continue;
            }
            let group = groups.entry(owner).or_default();
            if !group.contains(full_name) {
                group.push(full_name.clone());
            }
        }

        jobs.extend(groups.into_iter().map(|(owner, repos)| OwnerJob {
            owner: owner.to_string(),
            allowlist: Some(repos),
        }));
        jobs
    }
}

/// Why an owner was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Listed in the known-unreachable set.
    Unreachable,
    /// Processed within the freshness window.
    Fresh,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable => write!(f, "known unreachable"),
            Self::Fresh => write!(f, "recently synced"),
        }
    }
}

/// Why a new repository was not backfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    Fork,
    Empty,
    /// Created after the cutoff year.
    TooRecent { year: i32 },
    UnknownCreation,
}

impl std::fmt::Display for Ineligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fork => write!(f, "fork"),
            Self::Empty => write!(f, "empty repository"),
            Self::TooRecent { year } => write!(f, "created in {}", year),
            Self::UnknownCreation => write!(f, "unknown creation time"),
        }
    }
}

/// What happened to one discovered repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoAction {
    /// First sighting; `commits` rows were backfilled before the insert.
    Created { commits: usize },
    /// Known repository; snapshot overwritten.
    Updated,
}

/// Counters for one synced owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSyncStats {
    pub kind: OwnerKind,
    /// Whether this was the owner's first sync.
    pub first_fetch: bool,
    pub pages: u32,
    /// Repositories kept after allowlist filtering.
    pub discovered: usize,
    pub created: usize,
    pub updated: usize,
    /// Commit rows inserted by backfill.
    pub commits: usize,
}

impl OwnerSyncStats {
    pub fn new(kind: OwnerKind, first_fetch: bool) -> Self {
        Self {
            kind,
            first_fetch,
            pages: 0,
            discovered: 0,
            created: 0,
            updated: 0,
            commits: 0,
        }
    }

    pub fn record(&mut self, action: RepoAction) {
        match action {
            RepoAction::Created { commits } => {
                self.created += 1;
                self.commits += commits;
            }
            RepoAction::Updated => self.updated += 1,
        }
    }
}

/// Result of processing one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerOutcome {
    Synced(OwnerSyncStats),
    Skipped(SkipReason),
    /// Processing failed; the owner will be retried next run.
    Failed { reason: String },
}

/// Aggregate of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncTally {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub repos_created: usize,
    pub repos_updated: usize,
    pub commits: usize,
    /// `(owner, reason)` for every failed owner.
    pub failures: Vec<(String, String)>,
}

impl SyncTally {
    pub fn record(&mut self, owner: &str, outcome: &OwnerOutcome) {
        match outcome {
            OwnerOutcome::Synced(stats) => {
                self.synced += 1;
                self.repos_created += stats.created;
                self.repos_updated += stats.updated;
                self.commits += stats.commits;
            }
            OwnerOutcome::Skipped(_) => self.skipped += 1,
            OwnerOutcome::Failed { reason } => {
                self.failed += 1;
                self.failures.push((owner.to_string(), reason.clone()));
            }
        }
    }

    /// Number of owners processed in any way.
    pub fn total(&self) -> usize {
        self.synced + self.skipped + self.failed
    }
}
