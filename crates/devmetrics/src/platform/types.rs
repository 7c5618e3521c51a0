use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::Result;

/// Whether an account is an organization or an individual user.
///
/// The two kinds are listed through different host endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Organization,
    Individual,
}

impl OwnerKind {
    /// Build from the stored `is_org` flag.
    #[inline]
    pub fn from_is_org(is_org: bool) -> Self {
        if is_org {
            Self::Organization
        } else {
            Self::Individual
        }
    }

    #[inline]
    pub fn is_org(self) -> bool {
        matches!(self, Self::Organization)
    }
}

/// Information about an organization, as returned by a successful probe.
#[derive(Debug, Clone)]
pub struct OrgInfo {
    /// Organization login.
    pub name: String,
    /// Number of public repositories.
    pub public_repos: usize,
}

/// One repository as observed on the source host.
///
/// Mirrors the columns of `git_repos`. Curated fields (`tags`, `ecosystem`)
/// are never supplied by a host listing and stay `None` unless a caller
/// fills them in; `None` leaves the stored value alone on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostRepo {
    /// Upstream numeric ID.
    pub id: i64,
    /// Upstream GraphQL node ID.
    pub node_id: String,
    /// Login of the owning account.
    pub owner: String,
    /// Repository name.
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub default_branch: Option<String>,
    pub homepage: Option<String>,
    /// License object as returned by the host.
    pub license: Option<serde_json::Value>,
    pub topics: Vec<String>,
    pub tags: Option<Vec<String>>,
    pub ecosystem: Option<Vec<String>>,
    pub html_url: Option<String>,
    pub ssh_url: Option<String>,
    pub clone_url: Option<String>,
    pub fork: bool,
    pub archived: bool,
    pub disabled: bool,
    pub is_template: bool,
    pub has_issues: Option<bool>,
    pub has_projects: Option<bool>,
    pub has_wiki: Option<bool>,
    pub has_pages: Option<bool>,
    pub has_downloads: Option<bool>,
    pub has_discussions: Option<bool>,
    /// Size in KB. Zero means an empty repository.
    pub size: u64,
    pub forks_count: Option<u32>,
    pub stargazers_count: Option<u32>,
    pub watchers_count: Option<u32>,
    pub open_issues_count: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl HostRepo {
    /// Get the full name (owner/name).
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// The capabilities the sync engine needs from a source host.
///
/// Listings are requested one page at a time, sorted by push time with the
/// most recently pushed repository first. Pages are numbered from 1.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Probe whether `owner` is an organization.
    ///
    /// Any error (including not found) means the account should be treated
    /// as an individual.
    async fn probe_org(&self, owner: &str) -> Result<OrgInfo>;

    /// Fetch one page of an owner's repositories, newest push first.
    ///
    /// Organizations list every repository; individuals list only those they
    /// own.
    async fn list_repos(
        &self,
        owner: &str,
        kind: OwnerKind,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<HostRepo>>;
}

#[async_trait]
impl<T: SourceHost + ?Sized> SourceHost for std::sync::Arc<T> {
    async fn probe_org(&self, owner: &str) -> Result<OrgInfo> {
        (**self).probe_org(owner).await
    }

    async fn list_repos(
        &self,
        owner: &str,
        kind: OwnerKind,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<HostRepo>> {
        (**self).list_repos(owner, kind, page, per_page).await
    }
}
