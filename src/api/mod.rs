//
//  bitbucket-report
//  api/mod.rs
//

//! Bitbucket Cloud REST API bindings.
//!
//! This module contains the typed records deserialized from the Bitbucket
//! Cloud API (v2.0), the pagination envelope, and the HTTP client with the
//! paginated fetch routines for projects, repositories, and repository
//! issues.
//!
//! See the API documentation: <https://developer.atlassian.com/cloud/bitbucket/rest/>

use thiserror::Error;

pub mod client;
pub mod issues;
pub mod pagination;
pub mod projects;
pub mod repositories;

pub use client::BitbucketClient;

/// Error type for Bitbucket API operations.
///
/// A fetch aborts on the first error; pages accumulated before the failure
/// are discarded rather than returned as a partial result.
///
/// # Variants
///
/// | Variant | Description |
/// |---------|-------------|
/// | `Http` | Non-200 response, carries the status and a body snippet |
/// | `Network` | Transport-level failure (connect, TLS, timeout) |
/// | `Decode` | The response body could not be deserialized |
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-200 status.
    ///
    /// The message is extracted from the Bitbucket error body when possible,
    /// otherwise it is a snippet of the raw response body.
    #[error("HTTP {status} reading {url}: {message}")]
    Http {
        /// HTTP status code of the failed response.
        status: u16,
        /// URL of the failed request.
        url: String,
        /// Server-provided error message or raw body snippet.
        message: String,
    },

    /// A network-level error occurred during the request.
    ///
    /// Covers connection failures, TLS errors, and per-request timeouts.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not valid JSON for the expected type.
    #[error("Error decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}
