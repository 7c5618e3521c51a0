//! Integration tests for the sync engine against a real SQLite store.
//!
//! Key scenarios tested:
//! - A first sync of an organization stores the owner, its repositories and
//!   the backfilled commits
//! - A fresh owner is skipped without touching the host
//! - A stale owner is refreshed in place, keeping curated columns
//! - Rerunning a backfill does not duplicate commits
//! - Target repositories only reconcile the allowlisted names
//! - Backfill through libgit2 from a local repository

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use devmetrics::entity::prelude::*;
use devmetrics::platform::{self, HostError, HostRepo, OrgInfo, OwnerKind, SourceHost};
use devmetrics::connect_and_migrate;
use devmetrics::sync::{OwnerOutcome, SkipReason, SyncOptions, SyncTargets, Synchronizer};
use devmetrics::vcs::{self, CommitSource, Git2CommitSource, LogEntry};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};
use tempfile::TempDir;

// ─── Test doubles ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeHost {
    orgs: HashSet<String>,
    repos: HashMap<String, Vec<HostRepo>>,
    list_calls: Mutex<usize>,
}

impl FakeHost {
    fn org(owner: &str, repos: Vec<HostRepo>) -> Self {
        let mut host = Self::default();
        host.orgs.insert(owner.to_string());
        host.repos.insert(owner.to_string(), repos);
        host
    }

    fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl SourceHost for FakeHost {
    async fn probe_org(&self, owner: &str) -> platform::Result<OrgInfo> {
        if self.orgs.contains(owner) {
            Ok(OrgInfo {
                name: owner.to_string(),
                public_repos: 0,
            })
        } else {
            Err(HostError::not_found(owner))
        }
    }

    async fn list_repos(
        &self,
        owner: &str,
        _kind: OwnerKind,
        page: u32,
        per_page: u32,
    ) -> platform::Result<Vec<HostRepo>> {
        *self.list_calls.lock().unwrap() += 1;
        let all = self.repos.get(owner).cloned().unwrap_or_default();
        Ok(all
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect())
    }
}

/// Serves canned logs keyed by clone URL.
#[derive(Default)]
struct FakeVcs {
    logs: HashMap<String, Vec<LogEntry>>,
}

#[async_trait]
impl CommitSource for FakeVcs {
    async fn clone_repo(&self, url: &str, dest: &Path) -> vcs::Result<()> {
        std::fs::create_dir_all(dest).unwrap();
        std::fs::write(dest.join("URL"), url).unwrap();
        Ok(())
    }

    async fn read_log(&self, repo_dir: &Path, max_count: usize) -> vcs::Result<Vec<LogEntry>> {
        let url = std::fs::read_to_string(repo_dir.join("URL")).unwrap();
        let mut log = self.logs.get(&url).cloned().unwrap_or_default();
        log.truncate(max_count);
        Ok(log)
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

fn ymd(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn host_repo(owner: &str, name: &str, created: i32, pushed: DateTime<Utc>) -> HostRepo {
    HostRepo {
        id: i64::from(created) * 100 + name.len() as i64,
        node_id: format!("R_{owner}_{name}"),
        owner: owner.to_string(),
        name: name.to_string(),
        size: 64,
        clone_url: Some(format!("https://example.test/{owner}/{name}.git")),
        created_at: Some(ymd(created, 6, 1)),
        pushed_at: Some(pushed),
        topics: vec!["crypto".to_string()],
        ..Default::default()
    }
}

/// `total` commits, one per month starting at `year`-`month`, newest first.
fn monthly_log_from(year: i32, month: u32, total: usize) -> Vec<LogEntry> {
    let first = year as usize * 12 + month as usize - 1;
    (0..total)
        .map(|i| LogEntry {
            hash: format!("{i:040x}"),
            author_name: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            committer_name: "Ada".to_string(),
            committer_email: "ada@example.com".to_string(),
            authored_at: ymd(((first + i) / 12) as i32, ((first + i) % 12) as u32 + 1, 1),
            message: format!("change {i}"),
        })
        .rev()
        .collect()
}

fn options(workdir: &TempDir) -> SyncOptions {
    SyncOptions {
        pace: StdDuration::ZERO,
        workdir: Some(workdir.path().to_path_buf()),
        ..Default::default()
    }
}

fn acme_host(now: DateTime<Utc>) -> FakeHost {
    FakeHost::org(
        "acme",
        vec![
            host_repo("acme", "new-app", 2021, now),
            host_repo("acme", "old-lib", 2012, now - Duration::days(1)),
            host_repo("acme", "tools", 2021, now - Duration::days(2)),
        ],
    )
}

fn acme_vcs() -> FakeVcs {
    let mut vcs = FakeVcs::default();
    vcs.logs.insert(
        "https://example.test/acme/old-lib.git".to_string(),
        // 2016-09 through 2020-10: 40 commits before 2020
        monthly_log_from(2016, 9, 50),
    );
    vcs
}

async fn commit_count(db: &DatabaseConnection) -> u64 {
    RawCommit::find().count(db).await.unwrap()
}

async fn backdate_owner(db: &DatabaseConnection, name: &str, days: i64) {
    let owner = GitOwner::find_by_id(name.to_string())
        .one(db)
        .await
        .unwrap()
        .expect("owner stored");
    let mut active = owner.into_active_model();
    active.last_update_time = Set((Utc::now() - Duration::days(days)).fixed_offset());
    active.update(db).await.unwrap();
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_sync_stores_owner_repos_and_commits() {
    let db = setup_test_db().await;
    let workdir = TempDir::new().unwrap();
    let now = Utc::now();
    let engine = Synchronizer::new(acme_host(now), acme_vcs(), db.clone(), options(&workdir));

    let outcome = engine.refresh_owner("acme", None).await;

    let OwnerOutcome::Synced(stats) = outcome else {
        panic!("expected Synced, got {outcome:?}");
    };
    assert_eq!(stats.created, 3);
    assert_eq!(stats.commits, 40);

    let owner = GitOwner::find_by_id("acme".to_string())
        .one(&db)
        .await
        .unwrap()
        .expect("owner stored");
    assert!(owner.is_org);
    assert!(owner.is_fresh(Utc::now(), Duration::days(7)));

    assert_eq!(GitRepo::find().count(&db).await.unwrap(), 3);
    let old_lib = GitRepo::find_by_id("acme/old-lib".to_string())
        .one(&db)
        .await
        .unwrap()
        .expect("repo stored");
    assert_eq!(old_lib.owner, "acme");
    assert_eq!(old_lib.topics, serde_json::json!(["crypto"]));
    assert_eq!(old_lib.tags, serde_json::json!([]));

    assert_eq!(commit_count(&db).await, 40);
    let newest_kept = RawCommit::find()
        .filter(RawCommitColumn::Hash.eq(format!("{:040x}", 39)))
        .one(&db)
        .await
        .unwrap()
        .expect("2019-12 commit kept");
    assert_eq!(newest_kept.repo, "acme/old-lib");
    assert_eq!(newest_kept.created_at.with_timezone(&Utc), ymd(2019, 12, 1));

    // 2020 commits are beyond the horizon
    let dropped = RawCommit::find()
        .filter(RawCommitColumn::Hash.eq(format!("{:040x}", 40)))
        .one(&db)
        .await
        .unwrap();
    assert!(dropped.is_none());
}

#[tokio::test]
async fn test_fresh_owner_is_skipped_without_host_calls() {
    let db = setup_test_db().await;
    let workdir = TempDir::new().unwrap();
    let now = Utc::now();
    let host = Arc::new(acme_host(now));
    let engine = Synchronizer::new(Arc::clone(&host), acme_vcs(), db.clone(), options(&workdir));

    engine.refresh_owner("acme", None).await;
    let calls_after_first = host.list_calls();

    let outcome = engine.refresh_owner("acme", None).await;

    assert_eq!(outcome, OwnerOutcome::Skipped(SkipReason::Fresh));
    assert_eq!(host.list_calls(), calls_after_first);
    assert_eq!(commit_count(&db).await, 40);
}

#[tokio::test]
async fn test_stale_owner_refresh_keeps_curated_columns() {
    let db = setup_test_db().await;
    let workdir = TempDir::new().unwrap();
    let now = Utc::now();
    let engine = Synchronizer::new(acme_host(now), acme_vcs(), db.clone(), options(&workdir));
    engine.refresh_owner("acme", None).await;

    // Curate outside of the sync job, then let the owner go stale
    let owner = GitOwner::find_by_id("acme".to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active = owner.into_active_model();
    active.linked_projects = Set(serde_json::json!(["Acme Chain"]));
    active.update(&db).await.unwrap();

    let repo = GitRepo::find_by_id("acme/new-app".to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active = repo.into_active_model();
    active.ecosystem = Set(serde_json::json!(["Acme"]));
    active.update(&db).await.unwrap();

    backdate_owner(&db, "acme", 8).await;

    let outcome = engine.refresh_owner("acme", None).await;

    let OwnerOutcome::Synced(stats) = outcome else {
        panic!("expected Synced, got {outcome:?}");
    };
    assert!(!stats.first_fetch);
    assert_eq!(stats.created, 0);
    assert!(stats.updated >= 1);
    assert_eq!(stats.commits, 0);

    let owner = GitOwner::find_by_id("acme".to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner.linked_projects, serde_json::json!(["Acme Chain"]));
    assert!(owner.is_fresh(Utc::now(), Duration::days(7)));

    let repo = GitRepo::find_by_id("acme/new-app".to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(repo.ecosystem, serde_json::json!(["Acme"]));

    assert_eq!(commit_count(&db).await, 40);
}

#[tokio::test]
async fn test_rerun_backfill_does_not_duplicate_commits() {
    let db = setup_test_db().await;
    let workdir = TempDir::new().unwrap();
    let now = Utc::now();
    let engine = Synchronizer::new(acme_host(now), acme_vcs(), db.clone(), options(&workdir));
    engine.refresh_owner("acme", None).await;

    // Simulate a run interrupted after the commits were written but before
    // the repository row was created.
    GitRepo::delete_by_id("acme/old-lib".to_string())
        .exec(&db)
        .await
        .unwrap();
    backdate_owner(&db, "acme", 30).await;

    let outcome = engine.refresh_owner("acme", None).await;

    let OwnerOutcome::Synced(stats) = outcome else {
        panic!("expected Synced, got {outcome:?}");
    };
    assert_eq!(stats.created, 1);
    assert_eq!(stats.commits, 0);
    assert_eq!(commit_count(&db).await, 40);
    assert!(
        GitRepo::find_by_id("acme/old-lib".to_string())
            .one(&db)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_target_repos_only_reconcile_allowlist() {
    let db = setup_test_db().await;
    let workdir = TempDir::new().unwrap();
    let now = Utc::now();
    let mut host = FakeHost::default();
    host.repos.insert(
        "zeta".to_string(),
        vec![
            host_repo("zeta", "lib", 2021, now),
            host_repo("zeta", "other", 2021, now - Duration::days(1)),
        ],
    );
    let engine = Synchronizer::new(host, FakeVcs::default(), db.clone(), options(&workdir));

    let tally = engine
        .run(&SyncTargets::new(Vec::<String>::new(), ["zeta/lib"]))
        .await;

    assert_eq!(tally.synced, 1);
    assert_eq!(tally.repos_created, 1);
    assert!(
        GitRepo::find_by_id("zeta/lib".to_string())
            .one(&db)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        GitRepo::find_by_id("zeta/other".to_string())
            .one(&db)
            .await
            .unwrap()
            .is_none()
    );

    let owner = GitOwner::find_by_id("zeta".to_string())
        .one(&db)
        .await
        .unwrap()
        .expect("owner stored");
    assert!(!owner.is_org);
}

#[tokio::test]
async fn test_backfill_from_local_git_repository() {
    use git2::{Repository, Signature, Time};

    let db = setup_test_db().await;
    let workdir = TempDir::new().unwrap();
    let upstream = TempDir::new().unwrap();

    let repo = Repository::init(upstream.path()).unwrap();
    for (message, year) in [("genesis", 2013), ("fix", 2017), ("modern", 2022)] {
        let when = Time::new(ymd(year, 1, 1).timestamp(), 0);
        let sig = Signature::new("Satoshi", "satoshi@example.com", &when).unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    let mut vintage = host_repo("satoshi", "vintage", 2012, Utc::now());
    vintage.clone_url = Some(format!("file://{}", upstream.path().display()));
    let mut host = FakeHost::default();
    host.repos.insert("satoshi".to_string(), vec![vintage]);

    let engine = Synchronizer::new(host, Git2CommitSource::new(), db.clone(), options(&workdir));

    let outcome = engine.refresh_owner("satoshi", None).await;

    let OwnerOutcome::Synced(stats) = outcome else {
        panic!("expected Synced, got {outcome:?}");
    };
    assert_eq!(stats.commits, 2);
    assert_eq!(commit_count(&db).await, 2);

    let messages: HashSet<String> = RawCommit::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.message)
        .collect();
    assert!(messages.contains("genesis"));
    assert!(messages.contains("fix"));

    // Checkout released
    assert!(std::fs::read_dir(workdir.path()).unwrap().next().is_none());
}
