//! Version-control access for commit backfill.
//!
//! [`CommitSource`] is the clone/log capability the backfill pipeline uses.
//! [`Git2CommitSource`] implements it on libgit2, moving the blocking work
//! onto Tokio's blocking pool.

mod errors;
mod git;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use errors::{Result, VcsError};
pub use git::Git2CommitSource;

/// One entry of a repository's commit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub committer_name: String,
    pub committer_email: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
}

/// Clone a repository and read its history.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Clone the full history of `url` into `dest`.
    ///
    /// `dest` must not exist or be an empty directory.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Read up to `max_count` commits reachable from HEAD, newest first.
    ///
    /// A repository without any commits yields an empty log.
    async fn read_log(&self, repo_dir: &Path, max_count: usize) -> Result<Vec<LogEntry>>;
}
