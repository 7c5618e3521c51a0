//! RawCommit entity - one historical commit captured during backfill.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// RawCommit model. Rows are append-only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_commits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Full name of the repository the commit was extracted from.
    pub repo: String,
    /// Commit hash (hex).
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub committer_name: String,
    pub committer_email: String,
    /// Author timestamp of the commit.
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text")]
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::git_repo::Entity",
        from = "Column::Repo",
        to = "super::git_repo::Column::FullName"
    )]
    GitRepo,
}

impl Related<super::git_repo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GitRepo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
