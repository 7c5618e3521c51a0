use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::entity::git_owner::Model as GitOwnerModel;
use crate::entity::git_repo::Model as GitRepoModel;
use crate::platform::{HostRepo, OwnerKind};

use super::commit::{self, CommitRecord};
use super::errors::Result;
use super::{owner, repo};

/// The store operations the sync engine depends on.
///
/// Each write completes before the call returns. Find operations return at
/// most one record.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn find_owner(&self, name: &str) -> Result<Option<GitOwnerModel>>;

    async fn create_owner(
        &self,
        name: &str,
        kind: OwnerKind,
        at: DateTime<Utc>,
    ) -> Result<GitOwnerModel>;

    /// Advance an existing owner's `last_update_time` to `at` (never
    /// backwards), keeping everything else.
    async fn update_owner(
        &self,
        existing: GitOwnerModel,
        at: DateTime<Utc>,
    ) -> Result<GitOwnerModel>;

    async fn find_repo(&self, full_name: &str) -> Result<Option<GitRepoModel>>;

    /// Insert a repository under the owner group it was processed for.
    async fn create_repo(
        &self,
        repo: &HostRepo,
        group: &str,
        at: DateTime<Utc>,
    ) -> Result<GitRepoModel>;

    /// Replace the mutable snapshot of a stored repository.
    async fn update_repo(
        &self,
        existing: GitRepoModel,
        repo: &HostRepo,
        at: DateTime<Utc>,
    ) -> Result<GitRepoModel>;

    /// Append a commit; `false` if it was already stored.
    async fn append_commit(&self, commit: &CommitRecord) -> Result<bool>;
}

#[async_trait]
impl PersistenceGateway for DatabaseConnection {
    async fn find_owner(&self, name: &str) -> Result<Option<GitOwnerModel>> {
        owner::find(self, name).await
    }

    async fn create_owner(
        &self,
        name: &str,
        kind: OwnerKind,
        at: DateTime<Utc>,
    ) -> Result<GitOwnerModel> {
        owner::create(self, name, kind, at).await
    }

    async fn update_owner(
        &self,
        existing: GitOwnerModel,
        at: DateTime<Utc>,
    ) -> Result<GitOwnerModel> {
        owner::touch(self, existing, at).await
    }

    async fn find_repo(&self, full_name: &str) -> Result<Option<GitRepoModel>> {
        repo::find(self, full_name).await
    }

    async fn create_repo(
        &self,
        snapshot: &HostRepo,
        group: &str,
        at: DateTime<Utc>,
    ) -> Result<GitRepoModel> {
        repo::create(self, snapshot, group, at).await
    }

    async fn update_repo(
        &self,
        existing: GitRepoModel,
        snapshot: &HostRepo,
        at: DateTime<Utc>,
    ) -> Result<GitRepoModel> {
        repo::update(self, existing, snapshot, at).await
    }

    async fn append_commit(&self, record: &CommitRecord) -> Result<bool> {
        commit::append(self, record).await
    }
}
