//
//  bitbucket-report
//  api/client.rs
//

//! # HTTP Client for the Bitbucket Cloud API
//!
//! This module provides the HTTP client used by all fetch routines. It
//! handles authentication header injection, per-request timeouts, JSON
//! deserialization, and the page-following loop for paginated list
//! endpoints.
//!
//! ## Request model
//!
//! All I/O is sequential: one request is outstanding at a time and
//! pagination follows the server-provided `next` cursor in a strict loop.
//! There is no prefetching and no resumption from a partial cursor - any
//! error aborts the remaining sequence.

use std::time::Duration;

use anyhow::Result;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::pagination::Page;
use crate::api::ApiError;
use crate::session::Session;

/// Number of items requested per page.
///
/// 100 is the Bitbucket Cloud maximum and minimizes the number of requests.
pub const PAGE_LEN: u32 = 100;

/// Maximum number of body characters carried into an error message.
const BODY_SNIPPET_MAX: usize = 500;

/// Builds an [`ApiError`] from a non-200 response.
///
/// Bitbucket Cloud returns errors in the format:
/// ```json
/// {"type": "error", "error": {"message": "Human readable message"}}
/// ```
///
/// This function extracts that message when present. If parsing fails, a
/// snippet of the raw body is used instead so the caller still sees what the
/// server said.
pub fn format_api_error(status: StatusCode, url: &str, body: &str) -> ApiError {
    let mut message = None;

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        // Cloud format: {"type": "error", "error": {"message": "..."}}
        if let Some(m) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            message = Some(m.to_string());
        }
        // Alternative Cloud format: {"error": {"detail": "..."}}
        else if let Some(d) = json
            .get("error")
            .and_then(|e| e.get("detail"))
            .and_then(|m| m.as_str())
        {
            message = Some(d.to_string());
        }
        // Simple message format: {"message": "..."}
        else if let Some(m) = json.get("message").and_then(|m| m.as_str()) {
            message = Some(m.to_string());
        }
    }

    // Fallback to a snippet of the raw body.
    let message =
        message.unwrap_or_else(|| body.chars().take(BODY_SNIPPET_MAX).collect::<String>());

    ApiError::Http {
        status: status.as_u16(),
        url: url.to_string(),
        message,
    }
}

/// HTTP client for Bitbucket Cloud list endpoints.
///
/// The client owns the [`Session`] whose Basic authorization value is sent
/// on every request, and the service root URL that list URLs are built from.
///
/// # Creating a client
///
/// ```rust,no_run
/// use std::time::Duration;
/// use bitbucket_report::api::BitbucketClient;
/// use bitbucket_report::session::Session;
///
/// let session = Session::new("myworkspace", "someuser", "app-password")?;
/// let client = BitbucketClient::new(
///     session,
///     "https://api.bitbucket.org/2.0",
///     Duration::from_secs(300),
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct BitbucketClient {
    /// The underlying HTTP client, configured with the per-request timeout.
    http: Client,
    /// Service root, e.g. `https://api.bitbucket.org/2.0`.
    root_url: Url,
    /// Workspace identity and credentials.
    session: Session,
}

impl BitbucketClient {
    /// Creates a client for the given session and service root.
    ///
    /// # Parameters
    ///
    /// * `session` - workspace identity and credentials
    /// * `root_url` - service root URL, e.g. `https://api.bitbucket.org/2.0`
    /// * `timeout` - per-request timeout; a request exceeding it aborts the
    ///   whole fetch
    ///
    /// # Errors
    ///
    /// Returns an error if the root URL cannot be parsed or the HTTP client
    /// could not be created.
    pub fn new(session: Session, root_url: &str, timeout: Duration) -> Result<Self> {
        let root_url = Url::parse(root_url)?;
        if root_url.cannot_be_a_base() {
            anyhow::bail!("Service root URL \"{root_url}\" cannot be used as a base URL.");
        }

        Ok(Self {
            http: Client::builder()
                .user_agent(format!("bbr/{}", crate::VERSION))
                .timeout(timeout)
                .build()?,
            root_url,
            session,
        })
    }

    /// Returns the workspace ID of the underlying session.
    pub fn workspace_id(&self) -> &str {
        self.session.workspace_id()
    }

    /// URL of the first projects page:
    /// `{root}/workspaces/{workspace}/projects?pagelen=100`.
    pub fn projects_url(&self) -> Url {
        self.list_url(&["workspaces", self.session.workspace_id(), "projects"])
    }

    /// URL of the first repositories page:
    /// `{root}/repositories/{workspace}?pagelen=100`.
    pub fn repositories_url(&self) -> Url {
        self.list_url(&["repositories", self.session.workspace_id()])
    }

    /// URL of the first issues page for a repository:
    /// `{root}/repositories/{workspace}/{slug}/issues?pagelen=100`.
    pub fn repository_issues_url(&self, repository_slug: &str) -> Url {
        self.list_url(&[
            "repositories",
            self.session.workspace_id(),
            repository_slug,
            "issues",
        ])
    }

    /// Appends percent-encoded path segments to the root URL and sets the
    /// standard page-size query parameter.
    fn list_url(&self, segments: &[&str]) -> Url {
        let mut url = self.root_url.clone();
        // The root URL was validated as a base at construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url.set_query(Some(&format!("pagelen={PAGE_LEN}")));
        url
    }

    /// Makes an authenticated GET request for one page of results.
    ///
    /// # Type Parameters
    ///
    /// * `T` - the record type of the page's `values` array
    ///
    /// # Errors
    ///
    /// Returns an error for a transport failure, a non-200 status (with the
    /// status and a body snippet), or a body that does not deserialize.
    pub async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>, ApiError> {
        let response = self
            .http
            .get(url)
            .header(
                AUTHORIZATION,
                format!("Basic {}", self.session.authorization()),
            )
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(format_api_error(status, url, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches every page of a list endpoint, accumulating `values` in page
    /// order.
    ///
    /// The loop follows the `next` cursor as-is (it is an absolute URL) and
    /// stops when it is null or empty. On any error the pages already read
    /// are discarded and the error is returned - there is no partial result.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        first_url: Url,
    ) -> Result<Vec<T>, ApiError> {
        let mut all = Vec::new();
        let mut url = first_url.to_string();

        loop {
            debug!(%url, "reading page");
            let page: Page<T> = self.get_page(&url).await?;
            debug!(count = page.values.len(), "read page values");
            let next = page.next_url().map(|n| n.to_string());
            all.extend(page.values);

            match next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    fn client_for(server: &mockito::ServerGuard) -> BitbucketClient {
        let session = Session::new("ws", "user", "pw").unwrap();
        BitbucketClient::new(session, &server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_list_url_encodes_workspace_and_sets_pagelen() {
        let session = Session::new("my workspace", "user", "pw").unwrap();
        let client = BitbucketClient::new(
            session,
            "https://api.bitbucket.org/2.0",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.projects_url().as_str(),
            "https://api.bitbucket.org/2.0/workspaces/my%20workspace/projects?pagelen=100"
        );
    }

    #[test]
    fn test_list_url_tolerates_trailing_slash_in_root() {
        let session = Session::new("ws", "user", "pw").unwrap();
        let client = BitbucketClient::new(
            session,
            "https://api.bitbucket.org/2.0/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.repositories_url().as_str(),
            "https://api.bitbucket.org/2.0/repositories/ws?pagelen=100"
        );
    }

    #[tokio::test]
    async fn test_pagination_follows_next_and_preserves_page_order() {
        let mut server = mockito::Server::new_async().await;

        // The second-page cursor is opaque; use a URL unrelated to the first.
        let page2_url = format!("{}/cursor/page-two", server.url());
        let page1 = server
            .mock("GET", "/workspaces/ws/projects")
            .match_query(mockito::Matcher::UrlEncoded(
                "pagelen".into(),
                "100".into(),
            ))
            .match_header("authorization", "Basic dXNlcjpwdw==")
            .with_status(200)
            .with_body(format!(
                r#"{{"values": [{{"name": "a"}}, {{"name": "b"}}], "next": "{page2_url}"}}"#
            ))
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/cursor/page-two")
            .match_header("authorization", "Basic dXNlcjpwdw==")
            .with_status(200)
            .with_body(r#"{"values": [{"name": "c"}], "next": null}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let items: Vec<Item> = client.get_all_pages(client.projects_url()).await.unwrap();

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        page1.assert_async().await;
        page2.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_next_ends_pagination() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workspaces/ws/projects")
            .match_query(mockito::Matcher::UrlEncoded(
                "pagelen".into(),
                "100".into(),
            ))
            .with_status(200)
            .with_body(r#"{"values": [{"name": "only"}], "next": ""}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let items: Vec<Item> = client.get_all_pages(client.projects_url()).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_non_200_aborts_with_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workspaces/ws/projects")
            .match_query(mockito::Matcher::UrlEncoded(
                "pagelen".into(),
                "100".into(),
            ))
            .with_status(500)
            .with_body("internal broke")
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Vec<Item>, ApiError> = client.get_all_pages(client.projects_url()).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("500"), "missing status: {message}");
        assert!(message.contains("internal broke"), "missing body: {message}");
    }

    #[tokio::test]
    async fn test_cloud_error_message_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workspaces/ws/projects")
            .match_query(mockito::Matcher::UrlEncoded(
                "pagelen".into(),
                "100".into(),
            ))
            .with_status(403)
            .with_body(r#"{"type": "error", "error": {"message": "Access denied"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Vec<Item>, ApiError> = client.get_all_pages(client.projects_url()).await;
        assert!(result.unwrap_err().to_string().contains("Access denied"));
    }
}
