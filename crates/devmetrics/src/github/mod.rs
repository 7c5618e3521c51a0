//! GitHub implementation of the source host.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Response shapes for the endpoints used
//! - [`client`] - Client creation and the `SourceHost` implementation
//! - [`convert`] - Conversion to `HostRepo`
//!
//! ```ignore
//! use devmetrics::github::GitHubClient;
//! use devmetrics::platform::{ApiRateLimiter, rate_limits};
//!
//! let client = GitHubClient::new(&token, Some(ApiRateLimiter::new(rate_limits::GITHUB_DEFAULT_RPS)))?;
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{GitHubClient, create_client, repos_route};
pub use convert::{to_host_repo, to_org_info};
pub use error::{GitHubError, is_rate_limit_error, is_rate_limit_error_from_github};
pub use types::{OrgResponse, OwnerRef, RepoResponse};
