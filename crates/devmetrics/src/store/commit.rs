use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::entity::raw_commit::{ActiveModel, Column, Entity as RawCommit};

use super::errors::{Result, StoreError};

/// A commit extracted from a repository's history, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full name of the repository the commit came from.
    pub repo: String,
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub committer_name: String,
    pub committer_email: String,
    /// Author timestamp.
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Append one commit.
///
/// Returns `false` when the `(repo, hash)` pair is already stored, so a rerun
/// of an interrupted backfill doesn't duplicate rows.
pub async fn append(db: &DatabaseConnection, commit: &CommitRecord) -> Result<bool> {
    if commit.hash.is_empty() {
        return Err(StoreError::invalid_input("commit hash is empty"));
    }

    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        repo: Set(commit.repo.clone()),
        hash: Set(commit.hash.clone()),
        author_name: Set(commit.author_name.clone()),
        author_email: Set(commit.author_email.clone()),
        committer_name: Set(commit.committer_name.clone()),
        committer_email: Set(commit.committer_email.clone()),
        created_at: Set(commit.created_at.fixed_offset()),
        message: Set(commit.message.clone()),
    };

    let inserted = RawCommit::insert(model)
        .on_conflict(
            OnConflict::columns([Column::Repo, Column::Hash])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(inserted > 0)
}
