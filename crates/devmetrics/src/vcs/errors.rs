use thiserror::Error;

/// Errors from cloning or reading a repository.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Clone of {url} failed: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Commit {hash} has an invalid timestamp")]
    InvalidTimestamp { hash: String },

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, VcsError>;
