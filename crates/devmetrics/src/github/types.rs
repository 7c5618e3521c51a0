//! Response shapes for the GitHub REST endpoints the sync job calls.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Account reference embedded in a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerRef {
    pub login: String,
}

/// A repository as returned by `GET /orgs/{org}/repos` and
/// `GET /users/{user}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoResponse {
    pub id: i64,
    #[serde(default)]
    pub node_id: String,
    pub name: String,
    pub owner: OwnerRef,
    pub description: Option<String>,
    pub language: Option<String>,
    pub default_branch: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<serde_json::Value>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub html_url: Option<String>,
    pub ssh_url: Option<String>,
    pub clone_url: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub is_template: bool,
    pub has_issues: Option<bool>,
    pub has_projects: Option<bool>,
    pub has_wiki: Option<bool>,
    pub has_pages: Option<bool>,
    pub has_downloads: Option<bool>,
    pub has_discussions: Option<bool>,
    #[serde(default)]
    pub size: u64,
    pub forks_count: Option<u32>,
    pub stargazers_count: Option<u32>,
    pub watchers_count: Option<u32>,
    pub open_issues_count: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// The subset of `GET /orgs/{org}` the probe reads.
#[derive(Debug, Clone, Deserialize)]
pub struct OrgResponse {
    pub login: String,
    #[serde(default)]
    pub public_repos: usize,
}
