//! devmetrics - incremental owner/repository sync with commit backfill.
//!
//! This library keeps a local store of source-hosting accounts ("owners") and
//! their repositories up to date, and backfills historical commits for old,
//! non-fork repositories the first time they are seen.
//!
//! # Features
//!
//! - `github` - GitHub implementation of [`platform::SourceHost`].
//! - `sqlite` / `postgres` - database drivers for the SeaORM store.
//! - `migrate` - Enables [`connect_and_migrate`] and the schema migrations.
//!
//! # Example
//!
//! ```ignore
//! use devmetrics::github::GitHubClient;
//! use devmetrics::sync::{Synchronizer, SyncOptions, SyncTargets};
//! use devmetrics::vcs::Git2CommitSource;
//!
//! let db = devmetrics::connect_and_migrate("sqlite://devmetrics.db?mode=rwc").await?;
//! let host = GitHubClient::new(&token, None)?;
//! let engine = Synchronizer::new(host, Git2CommitSource::new(), db, SyncOptions::default());
//!
//! let targets = SyncTargets::new(["bitcoin"], ["someone/some-repo"]);
//! let tally = engine.run(&targets).await;
//! println!("{} synced, {} failed", tally.synced, tally.failed);
//! ```

pub mod db;
pub mod entity;
pub mod platform;
pub mod store;
pub mod sync;
pub mod vcs;

#[cfg(feature = "github")]
pub mod retry;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use platform::{HostError, HostRepo, OwnerKind, SourceHost};
pub use store::{PersistenceGateway, StoreError};
pub use vcs::{CommitSource, VcsError};
