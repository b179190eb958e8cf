//
//  bitbucket-report
//  session.rs
//

//! # Bitbucket Session
//!
//! A session holds the identity used for every request in one command
//! invocation: the workspace being queried and the app-password credential
//! used for HTTP Basic authentication.
//!
//! Sessions are deliberately static - there is no token refresh and no OAuth.
//! One credential is created from configuration, used for the lifetime of the
//! invocation, and discarded.

use anyhow::{bail, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Identity and credentials for one Bitbucket Cloud session.
///
/// Constructed from the workspace identifier, user name, and app password.
/// Construction fails with a configuration error (never an HTTP error) when
/// any of the three fields is missing, so that misconfiguration is reported
/// before the first network call.
///
/// # Example
///
/// ```rust
/// use bitbucket_report::session::Session;
///
/// let session = Session::new("myworkspace", "someuser", "app-password-123").unwrap();
/// assert_eq!(session.workspace_id(), "myworkspace");
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    /// Workspace ID, the top-level container for projects and repositories.
    workspace_id: String,

    /// Bitbucket user name.
    user_name: String,

    /// Scoped, revocable app password used in place of the account password.
    app_password: String,
}

impl Session {
    /// Creates a session from workspace, user name, and app password.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming every missing field when one or
    /// more of the inputs is empty.
    pub fn new(workspace_id: &str, user_name: &str, app_password: &str) -> Result<Self> {
        let mut problems = Vec::new();
        if workspace_id.is_empty() {
            problems.push("the workspace ID is not set");
        }
        if user_name.is_empty() {
            problems.push("the user name is not set");
        }
        if app_password.is_empty() {
            problems.push("the app password is not set");
        }
        if !problems.is_empty() {
            bail!("Invalid Bitbucket configuration: {}.", problems.join(", "));
        }

        Ok(Self {
            workspace_id: workspace_id.to_string(),
            user_name: user_name.to_string(),
            app_password: app_password.to_string(),
        })
    }

    /// Returns the value to send in the `Authorization: Basic <value>` header.
    ///
    /// The value is `base64("user_name:app_password")`.
    pub fn authorization(&self) -> String {
        BASE64.encode(format!("{}:{}", self.user_name, self.app_password))
    }

    /// Returns the workspace ID.
    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_is_base64_of_user_and_password() {
        let session = Session::new("ws", "user", "secret").unwrap();
        // base64("user:secret")
        assert_eq!(session.authorization(), "dXNlcjpzZWNyZXQ=");
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = Session::new("", "user", "").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("workspace ID"));
        assert!(message.contains("app password"));
        assert!(!message.contains("user name is not set"));
    }

    #[test]
    fn test_empty_workspace_is_rejected() {
        assert!(Session::new("", "user", "pw").is_err());
        assert!(Session::new("ws", "user", "pw").is_ok());
    }
}
