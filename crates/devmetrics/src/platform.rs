//! Source-host abstraction.
//!
//! This module defines the `SourceHost` trait: the two capabilities the sync
//! engine needs from a hosting platform (probe an account, list its
//! repositories page by page) plus the platform-agnostic [`HostRepo`]
//! snapshot those listings produce.
//!
//! # Example
//!
//! ```ignore
//! use devmetrics::platform::{OwnerKind, SourceHost};
//!
//! async fn first_page<H: SourceHost>(host: &H, owner: &str) -> devmetrics::platform::Result<()> {
//!     let kind = match host.probe_org(owner).await {
//!         Ok(_) => OwnerKind::Organization,
//!         Err(_) => OwnerKind::Individual,
//!     };
//!     for repo in host.list_repos(owner, kind, 1, 25).await? {
//!         println!("{} pushed at {:?}", repo.full_name(), repo.pushed_at);
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
#[cfg(feature = "github")]
mod rate_limit;
mod types;

pub use errors::{HostError, Result, short_error_message};
#[cfg(feature = "github")]
pub use rate_limit::{ApiRateLimiter, rate_limits};
pub use types::{HostRepo, OrgInfo, OwnerKind, SourceHost};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_messages_name_the_resource() {
        let err = HostError::not_found("ferum-dex");
        assert_eq!(err.to_string(), "ferum-dex does not exist on host");

        let err = HostError::api("502 Bad Gateway");
        assert_eq!(err.to_string(), "host request failed: 502 Bad Gateway");
    }

    #[test]
    fn test_rate_limited_message_carries_reset_time() {
        let reset_at = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = HostError::RateLimited { reset_at };
        assert!(err.to_string().contains("2023-11-14 22:13:20"));
    }

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = HostError::api("timeout\nstack frame 1\nstack frame 2");
        assert_eq!(short_error_message(&err), "host request failed: timeout");
    }

    #[test]
    fn test_owner_kind_from_is_org() {
        assert_eq!(OwnerKind::from_is_org(true), OwnerKind::Organization);
        assert_eq!(OwnerKind::from_is_org(false), OwnerKind::Individual);
        assert!(OwnerKind::Organization.is_org());
        assert!(!OwnerKind::Individual.is_org());
    }
}
