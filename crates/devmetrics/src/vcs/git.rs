use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks, Repository, Signature, Sort,
};

use super::errors::{Result, VcsError};
use super::{CommitSource, LogEntry};

/// [`CommitSource`] backed by libgit2.
///
/// SSH remotes authenticate through the running ssh-agent.
#[derive(Debug, Clone, Default)]
pub struct Git2CommitSource;

impl Git2CommitSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommitSource for Git2CommitSource {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || clone_blocking(&url, &dest)).await?
    }

    async fn read_log(&self, repo_dir: &Path, max_count: usize) -> Result<Vec<LogEntry>> {
        let repo_dir = repo_dir.to_path_buf();
        tokio::task::spawn_blocking(move || read_log_blocking(&repo_dir, max_count)).await?
    }
}

fn clone_blocking(url: &str, dest: &Path) -> Result<()> {
    tracing::debug!(url, dest = %dest.display(), "Cloning repository");

    let mut attempts = CredentialAttempts::default();
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed| {
        attempts.next(username_from_url, allowed)
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    git2::build::RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(url, dest)
        .map(|_| ())
        .map_err(|source| VcsError::Clone {
            url: url.to_string(),
            source,
        })
}

/// Credentials offered during one clone.
///
/// libgit2 asks again every time the remote rejects a credential, so each
/// kind is handed out at most once and the clone fails after that.
#[derive(Debug, Default)]
struct CredentialAttempts {
    agent: bool,
    default: bool,
}

impl CredentialAttempts {
    fn next(
        &mut self,
        username: Option<&str>,
        allowed: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        if allowed.is_ssh_key()
            && let Some(user) = username
        {
            if self.agent {
                return Err(git2::Error::from_str(
                    "ssh-agent key rejected; no other credentials to try",
                ));
            }
            self.agent = true;
            return Cred::ssh_key_from_agent(user);
        }

        if self.default {
            return Err(git2::Error::from_str("default credentials rejected"));
        }
        self.default = true;
        Cred::default()
    }
}

fn read_log_blocking(repo_dir: &Path, max_count: usize) -> Result<Vec<LogEntry>> {
    let repo = Repository::open(repo_dir)?;

    let mut walk = repo.revwalk()?;
    if let Err(e) = walk.push_head() {
        return match e.code() {
            ErrorCode::UnbornBranch | ErrorCode::NotFound => Ok(Vec::new()),
            _ => Err(e.into()),
        };
    }
    walk.set_sorting(Sort::TIME)?;

    let mut entries = Vec::new();
    for oid in walk.take(max_count) {
        let commit = repo.find_commit(oid?)?;
        let hash = commit.id().to_string();
        let author = commit.author();
        let committer = commit.committer();

        let authored_at = DateTime::<Utc>::from_timestamp(author.when().seconds(), 0)
            .ok_or_else(|| VcsError::InvalidTimestamp { hash: hash.clone() })?;

        entries.push(LogEntry {
            author_name: lossy_name(&author),
            author_email: lossy_email(&author),
            committer_name: lossy_name(&committer),
            committer_email: lossy_email(&committer),
            authored_at,
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            hash,
        });
    }

    Ok(entries)
}

fn lossy_name(sig: &Signature<'_>) -> String {
    String::from_utf8_lossy(sig.name_bytes()).into_owned()
}

fn lossy_email(sig: &Signature<'_>) -> String {
    String::from_utf8_lossy(sig.email_bytes()).into_owned()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use git2::Time;
    use tempfile::TempDir;

    use super::*;

    fn commit_at(repo: &Repository, message: &str, when: DateTime<Utc>) -> git2::Oid {
        let author = Signature::new("Ada", "ada@example.com", &Time::new(when.timestamp(), 0))
            .expect("author signature");
        let committer =
            Signature::new("Bot", "bot@example.com", &Time::new(when.timestamp(), 0))
                .expect("committer signature");

        let tree_id = repo
            .index()
            .expect("index")
            .write_tree()
            .expect("write tree");
        let tree = repo.find_tree(tree_id).expect("find tree");

        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        repo.commit(Some("HEAD"), &author, &committer, message, &tree, &parents)
            .expect("commit")
    }

    fn fixture_repo() -> (TempDir, Vec<git2::Oid>) {
        let dir = TempDir::new().expect("temp dir");
        let repo = Repository::init(dir.path()).expect("init repo");
        let oids = vec![
            commit_at(&repo, "first", Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap()),
            commit_at(&repo, "second", Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()),
            commit_at(&repo, "third", Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
        ];
        (dir, oids)
    }

    #[test]
    fn test_rejected_agent_key_is_not_offered_again() {
        let mut attempts = CredentialAttempts::default();

        let _first = attempts.next(Some("git"), CredentialType::SSH_KEY);
        match attempts.next(Some("git"), CredentialType::SSH_KEY) {
            Err(e) => assert!(e.message().contains("ssh-agent")),
            Ok(_) => panic!("agent credentials offered twice"),
        }
    }

    #[test]
    fn test_default_credentials_offered_once() {
        let mut attempts = CredentialAttempts::default();

        assert!(attempts.next(None, CredentialType::DEFAULT).is_ok());
        assert!(attempts.next(None, CredentialType::DEFAULT).is_err());
    }

    #[tokio::test]
    async fn test_read_log_newest_first() {
        let (dir, oids) = fixture_repo();
        let log = Git2CommitSource::new()
            .read_log(dir.path(), 1_000_000)
            .await
            .expect("read log");

        assert_eq!(log.len(), 3);
        assert_eq!(log[0].hash, oids[2].to_string());
        assert_eq!(log[0].message, "third");
        assert_eq!(log[2].author_name, "Ada");
        assert_eq!(log[2].committer_email, "bot@example.com");
        assert_eq!(
            log[2].authored_at,
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_read_log_respects_max_count() {
        let (dir, _) = fixture_repo();
        let log = Git2CommitSource::new()
            .read_log(dir.path(), 2)
            .await
            .expect("read log");
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_read_log_of_empty_repository() {
        let dir = TempDir::new().expect("temp dir");
        Repository::init(dir.path()).expect("init repo");

        let log = Git2CommitSource::new()
            .read_log(dir.path(), 10)
            .await
            .expect("read log");
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_clone_local_repository() {
        let (src, oids) = fixture_repo();
        let dest = TempDir::new().expect("temp dir");
        let target = dest.path().join("clone");
        let url = format!("file://{}", src.path().display());

        let source = Git2CommitSource::new();
        source.clone_repo(&url, &target).await.expect("clone");

        let log = source.read_log(&target, 10).await.expect("read log");
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].hash, oids[2].to_string());
    }

    #[tokio::test]
    async fn test_clone_missing_repository_fails() {
        let dest = TempDir::new().expect("temp dir");
        let missing = dest.path().join("does-not-exist");
        let url = format!("file://{}", missing.display());

        let err = Git2CommitSource::new()
            .clone_repo(&url, &dest.path().join("clone"))
            .await
            .expect_err("clone should fail");
        assert!(matches!(err, VcsError::Clone { .. }));
    }
}
