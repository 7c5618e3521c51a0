//! GitRepo entity - the last observed upstream snapshot of one repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// GitRepo model.
///
/// `id`, `node_id`, `owner` and `created_at` are identity fields: written once
/// when the row is created and never touched by later refreshes. Everything
/// else is replaced wholesale from the newest snapshot.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "git_repos")]
pub struct Model {
    /// "owner/name"; unique natural key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub full_name: String,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// Upstream numeric ID.
    pub id: i64,
    /// Upstream GraphQL node ID.
    pub node_id: String,
    /// Owner group this repository was first recorded under (weak reference).
    pub owner: String,
    /// When the repository was created on the host.
    pub created_at: Option<DateTimeWithTimeZone>,

    // ─── Content ─────────────────────────────────────────────────────────────
    /// Repository name (URL-safe slug).
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub language: Option<String>,
    pub default_branch: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub homepage: Option<String>,
    /// License object as returned by the host.
    #[sea_orm(column_type = "Json", nullable)]
    pub license: Option<serde_json::Value>,
    #[sea_orm(column_type = "Json")]
    pub topics: serde_json::Value,
    /// Curated tags (never supplied by the host).
    #[sea_orm(column_type = "Json")]
    pub tags: serde_json::Value,
    /// Curated ecosystem labels (never supplied by the host).
    #[sea_orm(column_type = "Json")]
    pub ecosystem: serde_json::Value,

    // ─── URLs ────────────────────────────────────────────────────────────────
    pub html_url: Option<String>,
    pub ssh_url: Option<String>,
    pub clone_url: Option<String>,

    // ─── Flags ───────────────────────────────────────────────────────────────
    #[sea_orm(default_value = false)]
    pub fork: bool,
    #[sea_orm(default_value = false)]
    pub archived: bool,
    #[sea_orm(default_value = false)]
    pub disabled: bool,
    #[sea_orm(default_value = false)]
    pub is_template: bool,
    pub has_issues: Option<bool>,
    pub has_projects: Option<bool>,
    pub has_wiki: Option<bool>,
    pub has_pages: Option<bool>,
    pub has_downloads: Option<bool>,
    pub has_discussions: Option<bool>,

    // ─── Statistics ──────────────────────────────────────────────────────────
    /// Size in KB as reported by the host.
    pub size: i64,
    pub forks_count: Option<i64>,
    pub stargazers_count: Option<i64>,
    pub watchers_count: Option<i64>,
    pub open_issues_count: Option<i64>,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    pub updated_at: Option<DateTimeWithTimeZone>,
    pub pushed_at: Option<DateTimeWithTimeZone>,
    /// When this row was last written by the sync job.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::raw_commit::Entity")]
    RawCommit,
}

impl Related<super::raw_commit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawCommit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
