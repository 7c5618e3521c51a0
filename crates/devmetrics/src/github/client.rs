//! GitHub API client creation and paged repository listing.

use std::sync::Arc;

use async_trait::async_trait;
use backon::Retryable;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;

use super::convert::{to_host_repo, to_org_info};
use super::error::{
    GitHubError, is_rate_limit_error, is_rate_limit_error_from_github, spent_quota_reset,
};
use super::types::{OrgResponse, RepoResponse};
use crate::platform::{
    self, ApiRateLimiter, HostError, HostRepo, OrgInfo, OwnerKind, SourceHost,
    short_error_message,
};
use crate::retry::RetryConfig;

/// Create an authenticated Octocrab instance from a GitHub token.
pub fn create_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(GitHubError::Api)
}

/// Route for one page of an owner's repositories, most recently pushed first.
pub fn repos_route(owner: &str, kind: OwnerKind, page: u32, per_page: u32) -> String {
    match kind {
        OwnerKind::Organization => format!(
            "/orgs/{}/repos?per_page={}&page={}&sort=pushed&direction=desc",
            owner, per_page, page
        ),
        OwnerKind::Individual => format!(
            "/users/{}/repos?type=owner&per_page={}&page={}&sort=pushed&direction=desc",
            owner, per_page, page
        ),
    }
}

/// GitHub client implementing [`SourceHost`].
///
/// Every request waits on the optional rate limiter and is retried with
/// exponential backoff when GitHub signals rate limiting.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
    rate_limiter: Option<ApiRateLimiter>,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a new GitHub client from an authentication token.
    pub fn new(token: &str, rate_limiter: Option<ApiRateLimiter>) -> Result<Self, GitHubError> {
        let client = create_client(token)?;
        Ok(Self::from_octocrab(client).with_rate_limiter(rate_limiter))
    }

    /// Create a GitHub client from an existing Octocrab instance.
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self {
            inner: Arc::new(client),
            rate_limiter: None,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Option<ApiRateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Backoff used while GitHub keeps answering 403/429.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Wait for rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// GET `route`, retrying on rate limiting.
    async fn get_json<T>(&self, route: &str, resource: &str) -> Result<T, GitHubError>
    where
        T: DeserializeOwned + Send,
    {
        let request = || async {
            self.wait_for_rate_limit().await;
            self.inner
                .get::<T, _, ()>(route, None::<&()>)
                .await
                .map_err(|e| GitHubError::from_api(resource, e))
        };

        let result = request
            .retry(self.retry.clone().into_backoff())
            .when(is_rate_limit_error_from_github)
            .notify(|err, dur| {
                tracing::debug!(
                    "Rate limited on {}, retrying in {:?}: {}",
                    route,
                    dur,
                    short_error_message(err)
                );
            })
            .await;

        match result {
            Err(GitHubError::Api(e)) if is_rate_limit_error(&e) => match self.quota_reset().await {
                Some(reset_at) => {
                    tracing::warn!("Quota exhausted on {}, resets at {}", route, reset_at);
                    Err(GitHubError::RateLimited { reset_at })
                }
                None => Err(GitHubError::Api(e)),
            },
            other => other,
        }
    }

    /// Reset time of the core quota when it is spent.
    async fn quota_reset(&self) -> Option<DateTime<Utc>> {
        let limits = self.inner.ratelimit().get().await.ok()?;
        let core = &limits.resources.core;
        spent_quota_reset(core.remaining, core.reset)
    }

    /// Get organization info.
    pub async fn get_org_info(&self, org: &str) -> Result<OrgInfo, GitHubError> {
        let org_data: OrgResponse = self
            .get_json(&format!("/orgs/{}", org), &format!("org: {}", org))
            .await?;
        Ok(to_org_info(org_data))
    }

    /// List one page of an owner's repositories.
    pub async fn list_repos_page(
        &self,
        owner: &str,
        kind: OwnerKind,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<HostRepo>, GitHubError> {
        let route = repos_route(owner, kind, page, per_page);
        let repos: Vec<RepoResponse> = self.get_json(&route, owner).await?;
        Ok(repos.into_iter().map(to_host_repo).collect())
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn probe_org(&self, owner: &str) -> platform::Result<OrgInfo> {
        self.get_org_info(owner)
            .await
            .map_err(HostError::from)
    }

    async fn list_repos(
        &self,
        owner: &str,
        kind: OwnerKind,
        page: u32,
        per_page: u32,
    ) -> platform::Result<Vec<HostRepo>> {
        self.list_repos_page(owner, kind, page, per_page)
            .await
            .map_err(HostError::from)
    }
}
