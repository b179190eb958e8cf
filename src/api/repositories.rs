//
//  bitbucket-report
//  api/repositories.rs
//

//! Repository records and the paginated repository fetch.
//!
//! Repositories are fetched per workspace. The wire record keeps the
//! timestamp fields as the ISO-8601 strings Bitbucket sends; parsed
//! [`DateTime`] values are derived once after the fetch so downstream code
//! never re-parses them.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiError, BitbucketClient};

/// A Bitbucket Cloud repository, one element of a `repositories` listing
/// page.
///
/// Sub-objects that are only carried along (owner, project, main branch,
/// links) are kept as raw JSON values rather than fully typed records.
///
/// # Notes
///
/// - `has_issues` is `false` when the repository's issue tracker is disabled;
///   issue listing uses it to skip the repository without a network call
/// - `created_at` and `updated_at` are not wire fields; they are filled in by
///   [`Repository::parse_timestamps`] after deserialization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    /// Display name of the repository.
    #[serde(default)]
    pub name: String,

    /// URL-safe slug used in API paths.
    #[serde(default)]
    pub slug: String,

    /// Server-assigned UUID, braces included (e.g. `{1234-...}`).
    #[serde(default)]
    pub uuid: String,

    /// Creation timestamp as sent by the server (ISO-8601).
    #[serde(default)]
    pub created_on: String,

    /// Last-update timestamp as sent by the server (ISO-8601).
    #[serde(default)]
    pub updated_on: String,

    /// Whether the repository's issue tracker is enabled.
    #[serde(default)]
    pub has_issues: bool,

    /// Whether the repository is private.
    #[serde(default)]
    pub is_private: bool,

    /// Repository size in bytes.
    #[serde(default)]
    pub size: i64,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Owning account, carried as raw JSON.
    #[serde(default)]
    pub owner: Option<serde_json::Value>,

    /// Containing project, carried as raw JSON.
    #[serde(default)]
    pub project: Option<serde_json::Value>,

    /// Main branch descriptor, carried as raw JSON.
    #[serde(default)]
    pub mainbranch: Option<serde_json::Value>,

    /// Hypermedia links, carried as raw JSON.
    #[serde(default)]
    pub links: Option<serde_json::Value>,

    /// `created_on` parsed to a datetime, when parseable.
    #[serde(skip)]
    pub created_at: Option<DateTime<FixedOffset>>,

    /// `updated_on` parsed to a datetime, when parseable.
    #[serde(skip)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Repository {
    /// Parses the wire timestamp strings into datetime values.
    ///
    /// Unparseable or empty strings leave the corresponding field `None`
    /// rather than failing the listing.
    pub fn parse_timestamps(&mut self) {
        self.created_at = DateTime::parse_from_rfc3339(&self.created_on).ok();
        self.updated_at = DateTime::parse_from_rfc3339(&self.updated_on).ok();
    }
}

/// Compares two repositories by name, ascending.
pub fn compare_repositories(a: &Repository, b: &Repository) -> Ordering {
    a.name.cmp(&b.name)
}

/// Reads all repositories in the client's workspace.
///
/// Pages through `GET {root}/repositories/{workspace}?pagelen=100` following
/// the `next` cursor, parses the timestamps of each repository, and sorts the
/// accumulated list by repository name.
pub async fn read_repositories(client: &BitbucketClient) -> Result<Vec<Repository>, ApiError> {
    let mut repositories: Vec<Repository> =
        client.get_all_pages(client.repositories_url()).await?;
    info!(count = repositories.len(), "read repositories");

    for repository in &mut repositories {
        repository.parse_timestamps();
    }

    repositories.sort_by(compare_repositories);
    Ok(repositories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repositories_sort_by_name() {
        let mut list: Vec<Repository> = ["second", "first", "third"]
            .iter()
            .map(|name| Repository {
                name: name.to_string(),
                ..Default::default()
            })
            .collect();
        list.sort_by(compare_repositories);
        let names: Vec<&str> = list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_timestamps_parse_from_wire_strings() {
        let mut repo: Repository = serde_json::from_str(
            r#"{
                "name": "demo",
                "slug": "demo",
                "created_on": "2024-03-01T10:15:30+00:00",
                "updated_on": "not a date"
            }"#,
        )
        .unwrap();
        repo.parse_timestamps();
        assert!(repo.created_at.is_some());
        assert!(repo.updated_at.is_none());
    }

    #[test]
    fn test_missing_optional_fields_deserialize_to_defaults() {
        let repo: Repository = serde_json::from_str(r#"{"name": "bare"}"#).unwrap();
        assert_eq!(repo.slug, "");
        assert!(!repo.has_issues);
        assert!(repo.owner.is_none());
    }
}
