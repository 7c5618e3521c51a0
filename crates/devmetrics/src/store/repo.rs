use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::json;

use crate::entity::git_repo::{ActiveModel, Entity as GitRepo, Model};
use crate::platform::HostRepo;

use super::errors::{Result, StoreError};

/// Find a repository by its full name ("owner/name").
pub async fn find(db: &DatabaseConnection, full_name: &str) -> Result<Option<Model>> {
    GitRepo::find_by_id(full_name.to_string())
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Insert a repository seen for the first time.
///
/// `group` is the owner name the repository was processed under, which can
/// differ from the login in the snapshot (renames, transfers).
pub async fn create(
    db: &DatabaseConnection,
    repo: &HostRepo,
    group: &str,
    at: DateTime<Utc>,
) -> Result<Model> {
    if repo.name.is_empty() {
        return Err(StoreError::invalid_input("repository name is empty"));
    }
    new_active_model(repo, group, at)
        .insert(db)
        .await
        .map_err(StoreError::from)
}

/// Overwrite the mutable snapshot of an existing repository.
pub async fn update(
    db: &DatabaseConnection,
    existing: Model,
    repo: &HostRepo,
    at: DateTime<Utc>,
) -> Result<Model> {
    refresh_active_model(existing, repo, at)
        .update(db)
        .await
        .map_err(StoreError::from)
}

/// Build the active model for a first insert: identity fields plus the full
/// snapshot.
pub fn new_active_model(repo: &HostRepo, group: &str, at: DateTime<Utc>) -> ActiveModel {
    let mut model = ActiveModel {
        full_name: Set(repo.full_name()),
        id: Set(repo.id),
        node_id: Set(repo.node_id.clone()),
        owner: Set(group.to_string()),
        created_at: Set(repo.created_at.map(|t| t.fixed_offset())),
        tags: Set(string_list(repo.tags.as_deref().unwrap_or_default())),
        ecosystem: Set(string_list(repo.ecosystem.as_deref().unwrap_or_default())),
        ..Default::default()
    };
    apply_snapshot(&mut model, repo, at);
    model
}

/// Build the active model for a refresh.
///
/// Identity fields (`id`, `node_id`, `owner`, `created_at`) stay as stored.
/// Curated lists are only replaced when the snapshot supplies them.
pub fn refresh_active_model(existing: Model, repo: &HostRepo, at: DateTime<Utc>) -> ActiveModel {
    let mut model: ActiveModel = existing.into();
    apply_snapshot(&mut model, repo, at);
    if let Some(tags) = &repo.tags {
        model.tags = Set(string_list(tags));
    }
    if let Some(ecosystem) = &repo.ecosystem {
        model.ecosystem = Set(string_list(ecosystem));
    }
    model
}

fn apply_snapshot(model: &mut ActiveModel, repo: &HostRepo, at: DateTime<Utc>) {
    model.name = Set(repo.name.clone());
    model.description = Set(repo.description.clone());
    model.language = Set(repo.language.clone());
    model.default_branch = Set(repo.default_branch.clone());
    model.homepage = Set(repo.homepage.clone());
    model.license = Set(repo.license.clone());
    model.topics = Set(string_list(&repo.topics));

    model.html_url = Set(repo.html_url.clone());
    model.ssh_url = Set(repo.ssh_url.clone());
    model.clone_url = Set(repo.clone_url.clone());

    model.fork = Set(repo.fork);
    model.archived = Set(repo.archived);
    model.disabled = Set(repo.disabled);
    model.is_template = Set(repo.is_template);
    model.has_issues = Set(repo.has_issues);
    model.has_projects = Set(repo.has_projects);
    model.has_wiki = Set(repo.has_wiki);
    model.has_pages = Set(repo.has_pages);
    model.has_downloads = Set(repo.has_downloads);
    model.has_discussions = Set(repo.has_discussions);

    model.size = Set(i64::try_from(repo.size).unwrap_or(i64::MAX));
    model.forks_count = Set(repo.forks_count.map(i64::from));
    model.stargazers_count = Set(repo.stargazers_count.map(i64::from));
    model.watchers_count = Set(repo.watchers_count.map(i64::from));
    model.open_issues_count = Set(repo.open_issues_count.map(i64::from));

    model.updated_at = Set(repo.updated_at.map(|t| t.fixed_offset()));
    model.pushed_at = Set(repo.pushed_at.map(|t| t.fixed_offset()));
    model.synced_at = Set(at.fixed_offset());
}

fn string_list(values: &[String]) -> serde_json::Value {
    json!(values)
}
