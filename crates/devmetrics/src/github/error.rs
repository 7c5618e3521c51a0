//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::platform::HostError;

/// Failures of the org lookup and repository listing calls.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Api(#[from] octocrab::Error),

    /// Retries ran out and `/rate_limit` confirmed the core quota is spent.
    #[error("GitHub quota exhausted until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("GitHub rejected the token")]
    AuthRequired,

    #[error("{0} not found on GitHub")]
    NotFound(String),
}

/// HTTP status of an API error response, if any.
fn status_code(e: &octocrab::Error) -> Option<u16> {
    match e {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// Check if an error indicates a rate limit (403/429 or JSON parse error from empty response).
pub fn is_rate_limit_error(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { .. } => matches!(status_code(e), Some(403 | 429)),
        // Empty response body (EOF) often indicates rate limiting
        octocrab::Error::Json { .. } => true,
        _ => false,
    }
}

/// Check if a GitHubError indicates rate limiting.
pub fn is_rate_limit_error_from_github(e: &GitHubError) -> bool {
    match e {
        GitHubError::Api(octocrab_err) => is_rate_limit_error(octocrab_err),
        GitHubError::RateLimited { .. } => true,
        _ => false,
    }
}

/// Reset time of the core quota, if it is spent.
///
/// A 403 or 429 that outlives the retry budget becomes
/// [`GitHubError::RateLimited`] only when GitHub confirms the quota is gone;
/// otherwise the original response stands.
pub(super) fn spent_quota_reset(remaining: usize, reset: u64) -> Option<DateTime<Utc>> {
    if remaining > 0 {
        return None;
    }
    Some(DateTime::from_timestamp(reset as i64, 0).unwrap_or_else(Utc::now))
}

impl GitHubError {
    /// Classify a raw API error for `resource`.
    pub(super) fn from_api(resource: &str, e: octocrab::Error) -> Self {
        match status_code(&e) {
            Some(404) => Self::NotFound(resource.to_string()),
            Some(401) => Self::AuthRequired,
            _ => Self::Api(e),
        }
    }
}

impl From<GitHubError> for HostError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { reset_at } => HostError::RateLimited { reset_at },
            GitHubError::AuthRequired => HostError::AuthRequired,
            GitHubError::NotFound(resource) => HostError::not_found(resource),
            GitHubError::Api(e) => HostError::api(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rate_limit_error_from_github() {
        let rate_limited = GitHubError::RateLimited {
            reset_at: Utc::now(),
        };
        assert!(is_rate_limit_error_from_github(&rate_limited));

        let not_found = GitHubError::NotFound("acme".to_string());
        assert!(!is_rate_limit_error_from_github(&not_found));

        let auth_required = GitHubError::AuthRequired;
        assert!(!is_rate_limit_error_from_github(&auth_required));
    }

    #[test]
    fn test_into_host_error() {
        let err: HostError = GitHubError::NotFound("orgs/alice".to_string()).into();
        assert!(matches!(err, HostError::NotFound { ref resource } if resource == "orgs/alice"));

        let err: HostError = GitHubError::AuthRequired.into();
        assert!(matches!(err, HostError::AuthRequired));

        let reset_at = Utc::now();
        let err: HostError = GitHubError::RateLimited { reset_at }.into();
        assert!(matches!(err, HostError::RateLimited { reset_at: r } if r == reset_at));
    }

    #[test]
    fn test_spent_quota_reset_only_when_nothing_remains() {
        assert_eq!(spent_quota_reset(12, 1_700_000_000), None);

        let reset_at = spent_quota_reset(0, 1_700_000_000).unwrap();
        assert_eq!(reset_at.timestamp(), 1_700_000_000);
    }
}
