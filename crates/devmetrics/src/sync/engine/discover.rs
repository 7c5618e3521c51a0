use chrono::{DateTime, Utc};

use crate::platform::{HostRepo, OwnerKind, SourceHost};

use super::super::error::{Result, SyncError};
use super::super::progress::{ProgressCallback, SyncProgress, emit};

/// Repositories collected for one owner.
pub(super) struct Discovered {
    pub(super) repos: Vec<HostRepo>,
    pub(super) pages: u32,
}

/// Decide whether another page is needed.
///
/// `since` is the owner's stored `last_update_time` (`None` on a first
/// fetch); `oldest_pushed` is the push time of the last item on the page.
pub(super) fn should_fetch_next_page(
    count: usize,
    per_page: u32,
    since: Option<DateTime<Utc>>,
    oldest_pushed: Option<DateTime<Utc>>,
) -> bool {
    if count < per_page as usize {
        return false;
    }
    match since {
        None => true,
        // Keep paging only while the page still reaches past the last sync
        Some(since) => oldest_pushed.is_some_and(|pushed| since < pushed),
    }
}

/// Page through an owner's repositories, newest push first.
pub(super) async fn discover_repos<H: SourceHost>(
    host: &H,
    owner: &str,
    kind: OwnerKind,
    since: Option<DateTime<Utc>>,
    per_page: u32,
    on_progress: Option<&ProgressCallback>,
) -> Result<Discovered> {
    emit(
        on_progress,
        SyncProgress::FetchingRepos {
            owner: owner.to_string(),
            per_page,
            first_fetch: since.is_none(),
        },
    );

    let mut repos = Vec::new();
    let mut page = 1;
    loop {
        let batch = host
            .list_repos(owner, kind, page, per_page)
            .await
            .map_err(|source| SyncError::Fetch {
                owner: owner.to_string(),
                source,
            })?;

        let count = batch.len();
        let oldest_pushed = batch.last().and_then(|r| r.pushed_at);
        repos.extend(batch);

        emit(
            on_progress,
            SyncProgress::FetchedPage {
                owner: owner.to_string(),
                page,
                count,
                total_so_far: repos.len(),
            },
        );

        if !should_fetch_next_page(count, per_page, since, oldest_pushed) {
            break;
        }
        page += 1;
    }

    emit(
        on_progress,
        SyncProgress::FetchComplete {
            owner: owner.to_string(),
            total: repos.len(),
            pages: page,
        },
    );

    Ok(Discovered { repos, pages: page })
}

/// Keep only repositories named in `allowlist`, if one is given.
pub(super) fn apply_allowlist(repos: Vec<HostRepo>, allowlist: Option<&[String]>) -> Vec<HostRepo> {
    match allowlist {
        None => repos,
        Some(allowed) => repos
            .into_iter()
            .filter(|repo| {
                let full_name = repo.full_name();
                allowed.iter().any(|a| *a == full_name)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_short_page_stops() {
        assert!(!should_fetch_next_page(3, 99, None, None));
        assert!(!should_fetch_next_page(0, 25, Some(Utc::now()), None));
    }

    #[test]
    fn test_full_first_page_continues() {
        assert!(should_fetch_next_page(99, 99, None, None));
    }

    #[test]
    fn test_refresh_stops_once_past_last_sync() {
        let since = Utc::now() - Duration::days(10);
        assert!(!should_fetch_next_page(
            25,
            25,
            Some(since),
            Some(since - Duration::days(1))
        ));
        assert!(!should_fetch_next_page(25, 25, Some(since), Some(since)));
    }

    #[test]
    fn test_refresh_continues_while_page_is_newer() {
        let since = Utc::now() - Duration::days(10);
        assert!(should_fetch_next_page(
            25,
            25,
            Some(since),
            Some(since + Duration::days(1))
        ));
    }

    #[test]
    fn test_refresh_stops_without_push_time() {
        let since = Utc::now() - Duration::days(10);
        assert!(!should_fetch_next_page(25, 25, Some(since), None));
    }

    #[test]
    fn test_apply_allowlist() {
        let repo = |name: &str| HostRepo {
            owner: "zeta".to_string(),
            name: name.to_string(),
            ..Default::default()
        };
        let repos = vec![repo("a"), repo("b"), repo("c")];

        let all = apply_allowlist(repos.clone(), None);
        assert_eq!(all.len(), 3);

        let allowed = vec!["zeta/c".to_string(), "zeta/a".to_string(), "other/b".to_string()];
        let kept = apply_allowlist(repos, Some(allowed.as_slice()));
        let names: Vec<_> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
