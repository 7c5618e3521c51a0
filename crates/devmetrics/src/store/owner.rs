use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::json;

use crate::entity::git_owner::{ActiveModel, Entity as GitOwner, Model};
use crate::platform::OwnerKind;

use super::errors::{Result, StoreError};

/// Find an owner by name.
pub async fn find(db: &DatabaseConnection, name: &str) -> Result<Option<Model>> {
    GitOwner::find_by_id(name.to_string())
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Insert a newly processed owner.
///
/// Curated lists start out empty.
///
/// # Errors
/// Returns `StoreError::InvalidInput` for an empty name and
/// `StoreError::Database` if the insert fails (e.g., the owner already exists).
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    kind: OwnerKind,
    at: DateTime<Utc>,
) -> Result<Model> {
    if name.is_empty() {
        return Err(StoreError::invalid_input("owner name is empty"));
    }

    let model = ActiveModel {
        name: Set(name.to_string()),
        is_org: Set(kind.is_org()),
        last_update_time: Set(at.fixed_offset()),
        linked_projects: Set(json!([])),
        ecosystem: Set(json!([])),
    };
    model.insert(db).await.map_err(StoreError::from)
}

/// Record another successful pass over an existing owner.
///
/// Only `last_update_time` changes, and it never moves backwards: the stored
/// value wins if it is ahead of `at`.
pub async fn touch(db: &DatabaseConnection, existing: Model, at: DateTime<Utc>) -> Result<Model> {
    let next = std::cmp::max(existing.last_update_time.with_timezone(&Utc), at);

    let mut model: ActiveModel = existing.into();
    model.last_update_time = Set(next.fixed_offset());
    model.update(db).await.map_err(StoreError::from)
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::connect_and_migrate;

    async fn setup_db() -> DatabaseConnection {
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("Failed to create test database")
    }

    #[tokio::test]
    async fn test_create_and_find_owner() {
        let db = setup_db().await;
        let now = Utc::now();

        let created = create(&db, "acme", OwnerKind::Organization, now)
            .await
            .expect("create should succeed");
        assert!(created.is_org);
        assert_eq!(created.linked_projects, json!([]));
        assert_eq!(created.ecosystem, json!([]));

        let found = find(&db, "acme")
            .await
            .expect("find should succeed")
            .expect("owner should exist");
        assert_eq!(found.name, "acme");
        assert_eq!(found.last_update_time.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_find_missing_owner_returns_none() {
        let db = setup_db().await;
        let found = find(&db, "nobody").await.expect("find should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = setup_db().await;
        let err = create(&db, "", OwnerKind::Individual, Utc::now())
            .await
            .expect_err("empty name should be rejected");
        assert!(matches!(err, StoreError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_touch_keeps_curated_fields() {
        let db = setup_db().await;
        let then = Utc::now() - Duration::days(10);
        let owner = create(&db, "acme", OwnerKind::Organization, then)
            .await
            .expect("create should succeed");

        let mut curated: ActiveModel = owner.into();
        curated.linked_projects = Set(json!(["Acme Protocol"]));
        curated.ecosystem = Set(json!(["ethereum"]));
        let owner = curated.update(&db).await.expect("curation should succeed");

        let now = Utc::now();
        let touched = touch(&db, owner, now).await.expect("touch should succeed");
        assert_eq!(touched.linked_projects, json!(["Acme Protocol"]));
        assert_eq!(touched.ecosystem, json!(["ethereum"]));
        assert!(touched.is_org);
        assert_eq!(touched.last_update_time.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_touch_never_moves_time_backwards() {
        let db = setup_db().await;
        let future = Utc::now() + Duration::days(1);
        let owner = create(&db, "acme", OwnerKind::Organization, future)
            .await
            .expect("create should succeed");

        let touched = touch(&db, owner, Utc::now())
            .await
            .expect("touch should succeed");
        assert_eq!(touched.last_update_time.timestamp(), future.timestamp());
    }
}
