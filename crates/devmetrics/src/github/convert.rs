//! Conversion from GitHub API responses to host-agnostic types.

use crate::platform::{HostRepo, OrgInfo};

use super::types::{OrgResponse, RepoResponse};

/// Convert a GitHub repository to a [`HostRepo`].
///
/// GitHub has no notion of curated tags or ecosystems, so those stay unset.
pub fn to_host_repo(repo: RepoResponse) -> HostRepo {
    HostRepo {
        id: repo.id,
        node_id: repo.node_id,
        owner: repo.owner.login,
        name: repo.name,
        description: repo.description,
        language: repo.language,
        default_branch: repo.default_branch,
        homepage: repo.homepage.filter(|h| !h.is_empty()),
        license: repo.license.filter(|l| !l.is_null()),
        topics: repo.topics,
        tags: None,
        ecosystem: None,
        html_url: repo.html_url,
        ssh_url: repo.ssh_url,
        clone_url: repo.clone_url,
        fork: repo.fork,
        archived: repo.archived,
        disabled: repo.disabled,
        is_template: repo.is_template,
        has_issues: repo.has_issues,
        has_projects: repo.has_projects,
        has_wiki: repo.has_wiki,
        has_pages: repo.has_pages,
        has_downloads: repo.has_downloads,
        has_discussions: repo.has_discussions,
        size: repo.size,
        forks_count: repo.forks_count,
        stargazers_count: repo.stargazers_count,
        watchers_count: repo.watchers_count,
        open_issues_count: repo.open_issues_count,
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        pushed_at: repo.pushed_at,
    }
}

pub fn to_org_info(org: OrgResponse) -> OrgInfo {
    OrgInfo {
        name: org.login,
        public_repos: org.public_repos,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn sample() -> serde_json::Value {
        json!({
            "id": 1296269,
            "node_id": "MDEwOlJlcG9zaXRvcnkxMjk2MjY5",
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": { "login": "octocat", "id": 1 },
            "private": false,
            "html_url": "https://github.com/octocat/Hello-World",
            "description": "This your first repo!",
            "fork": false,
            "homepage": "",
            "language": null,
            "clone_url": "https://github.com/octocat/Hello-World.git",
            "ssh_url": "git@github.com:octocat/Hello-World.git",
            "size": 108,
            "forks_count": 9,
            "stargazers_count": 80,
            "watchers_count": 80,
            "open_issues_count": 0,
            "default_branch": "master",
            "topics": ["octocat", "api"],
            "has_issues": true,
            "has_projects": true,
            "has_wiki": true,
            "has_pages": false,
            "has_downloads": true,
            "archived": false,
            "disabled": false,
            "license": { "key": "mit", "spdx_id": "MIT" },
            "pushed_at": "2011-01-26T19:06:43Z",
            "created_at": "2011-01-26T19:01:12Z",
            "updated_at": "2011-01-26T19:14:43Z"
        })
    }

    #[test]
    fn test_to_host_repo() {
        let response: RepoResponse = serde_json::from_value(sample()).expect("deserialize");
        let repo = to_host_repo(response);

        assert_eq!(repo.full_name(), "octocat/Hello-World");
        assert_eq!(repo.id, 1296269);
        assert_eq!(repo.size, 108);
        assert_eq!(repo.stargazers_count, Some(80));
        assert_eq!(repo.topics, vec!["octocat", "api"]);
        assert_eq!(repo.homepage, None);
        assert_eq!(repo.language, None);
        assert_eq!(repo.has_discussions, None);
        assert!(repo.tags.is_none());
        assert!(repo.ecosystem.is_none());
        assert_eq!(repo.license, Some(json!({ "key": "mit", "spdx_id": "MIT" })));
        assert_eq!(
            repo.created_at,
            Some(Utc.with_ymd_and_hms(2011, 1, 26, 19, 1, 12).unwrap())
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let response: RepoResponse = serde_json::from_value(json!({
            "id": 1,
            "name": "bare",
            "owner": { "login": "someone" }
        }))
        .expect("deserialize");
        let repo = to_host_repo(response);

        assert!(!repo.fork);
        assert_eq!(repo.size, 0);
        assert!(repo.topics.is_empty());
        assert!(repo.pushed_at.is_none());
    }

    #[test]
    fn test_to_org_info() {
        let org: OrgResponse = serde_json::from_value(json!({
            "login": "acme",
            "public_repos": 12,
            "description": null
        }))
        .expect("deserialize");
        let info = to_org_info(org);
        assert_eq!(info.name, "acme");
        assert_eq!(info.public_repos, 12);
    }
}
