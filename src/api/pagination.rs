//
//  bitbucket-report
//  api/pagination.rs
//

//! Pagination envelope for Bitbucket Cloud list responses.
//!
//! Bitbucket Cloud uses cursor-based pagination: every list response carries
//! a `values` array plus an opaque `next` URL. A client iterates by following
//! `next` until it is absent or empty. The cursor is a fully qualified
//! absolute URL and must be used as-is - query parameters are never
//! re-appended or re-encoded.

use serde::{Deserialize, Serialize};

/// One page of results from a Bitbucket Cloud list endpoint.
///
/// # Type Parameters
///
/// - `T` - The type of items contained in the `values` array
///
/// # Example
///
/// ```rust
/// use bitbucket_report::api::pagination::Page;
/// use serde::Deserialize;
///
/// #[derive(Clone, Deserialize)]
/// struct Repository {
///     slug: String,
/// }
///
/// let json = r#"{
///     "values": [{"slug": "repo1"}],
///     "page": 1,
///     "pagelen": 100,
///     "next": "https://api.bitbucket.org/2.0/repositories/ws?pagelen=100&page=2"
/// }"#;
///
/// let page: Page<Repository> = serde_json::from_str(json).unwrap();
/// assert!(page.next_url().is_some());
/// ```
///
/// # Notes
///
/// - The `size` field may be omitted by the server for performance
/// - An empty-string `next` terminates iteration the same as a missing one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in the current page. May be empty.
    pub values: Vec<T>,

    /// Current page number (1-indexed), when reported.
    #[serde(default)]
    pub page: Option<u32>,

    /// Requested number of items per page.
    #[serde(default)]
    pub pagelen: Option<u32>,

    /// Total number of items across all pages, when reported.
    #[serde(default)]
    pub size: Option<u32>,

    /// Absolute URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,

    /// Absolute URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> Page<T> {
    /// Returns the URL of the next page, or `None` when this is the last one.
    ///
    /// An empty-string `next` value is treated as "no next page" so that the
    /// pagination loop terminates on either representation.
    pub fn next_url(&self) -> Option<&str> {
        match self.next.as_deref() {
            Some("") | None => None,
            Some(url) => Some(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Serialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_next_url_present() {
        let page: Page<Item> = serde_json::from_str(
            r#"{"values": [], "next": "https://example.com/page2"}"#,
        )
        .unwrap();
        assert_eq!(page.next_url(), Some("https://example.com/page2"));
    }

    #[test]
    fn test_null_next_ends_iteration() {
        let page: Page<Item> = serde_json::from_str(r#"{"values": [], "next": null}"#).unwrap();
        assert_eq!(page.next_url(), None);
    }

    #[test]
    fn test_empty_next_ends_iteration() {
        let page: Page<Item> = serde_json::from_str(r#"{"values": [], "next": ""}"#).unwrap();
        assert_eq!(page.next_url(), None);
    }

    #[test]
    fn test_missing_next_ends_iteration() {
        let page: Page<Item> = serde_json::from_str(r#"{"values": []}"#).unwrap();
        assert_eq!(page.next_url(), None);
    }
}
