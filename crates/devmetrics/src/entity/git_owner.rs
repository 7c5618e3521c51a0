//! GitOwner entity - an account (organization or individual) on the source host.

use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// GitOwner model - one row per tracked account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "git_owners")]
pub struct Model {
    /// Account login; unique natural key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// Whether the account is an organization (vs. an individual user).
    #[sea_orm(default_value = false)]
    pub is_org: bool,
    /// When this owner was last successfully processed.
    pub last_update_time: DateTimeWithTimeZone,
    /// Project references curated outside of the sync job (JSON array).
    #[sea_orm(column_type = "Json")]
    pub linked_projects: serde_json::Value,
    /// Ecosystem tags curated outside of the sync job (JSON array).
    #[sea_orm(column_type = "Json")]
    pub ecosystem: serde_json::Value,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this owner was processed within `window` of `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.last_update_time.with_timezone(&Utc) >= now - window
    }
}
