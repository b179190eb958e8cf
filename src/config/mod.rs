//
//  bitbucket-report
//  config/mod.rs
//

//! # Configuration Module
//!
//! Configuration is read from a TOML file in the platform config directory,
//! then overridden by environment variables, then by command-line options.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bbr/config.toml`
//! - **macOS**: `~/Library/Application Support/bbr/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bbr\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! workspace = "myworkspace"
//! username = "someuser"
//! app_password = "app-password-123"
//! api_root = "https://api.bitbucket.org/2.0"
//! timeout_seconds = 300
//! ```
//!
//! ## Environment Overrides
//!
//! `BBR_WORKSPACE`, `BBR_USERNAME`, `BBR_APP_PASSWORD`, `BBR_API_ROOT`, and
//! `BBR_TIMEOUT_SECONDS` override the corresponding file values. The app
//! password in particular is usually supplied this way rather than stored on
//! disk.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::Session;

/// Default Bitbucket Cloud API root.
pub const DEFAULT_API_ROOT: &str = "https://api.bitbucket.org/2.0";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

/// Resolved configuration for one invocation.
///
/// All fields use `#[serde(default)]` so a partial configuration file is
/// acceptable; missing credentials are only an error when a session is
/// actually built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace ID queried by the listing operations.
    #[serde(default)]
    pub workspace: String,

    /// Bitbucket user name.
    #[serde(default)]
    pub username: String,

    /// App password for HTTP Basic authentication.
    #[serde(default)]
    pub app_password: String,

    /// Service root URL.
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: String::new(),
            username: String::new(),
            app_password: String::new(),
            api_root: default_api_root(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Config {
    /// Returns the configuration file path for this platform, if resolvable.
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "bbr").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the configuration file (when present) and applies environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::path() {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading configuration file");
                let content = std::fs::read_to_string(&path).with_context(|| {
                    format!("Unable to read configuration file \"{}\"", path.display())
                })?;
                Self::from_toml(&content)?
            }
            _ => Self::default(),
        };

        config.apply_env_from(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration file")
    }

    /// Applies environment overrides using the given variable lookup.
    ///
    /// Separated from [`Config::load`] so tests can supply variables without
    /// touching the process environment.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(value) = get("BBR_WORKSPACE") {
            self.workspace = value;
        }
        if let Some(value) = get("BBR_USERNAME") {
            self.username = value;
        }
        if let Some(value) = get("BBR_APP_PASSWORD") {
            self.app_password = value;
        }
        if let Some(value) = get("BBR_API_ROOT") {
            self.api_root = value;
        }
        if let Some(value) = get("BBR_TIMEOUT_SECONDS") {
            if let Ok(seconds) = value.parse() {
                self.timeout_seconds = seconds;
            }
        }
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Builds a session from the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming every missing credential field.
    pub fn session(&self) -> Result<Session> {
        Session::new(&self.workspace, &self.username, &self.app_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config = Config::from_toml("workspace = \"ws\"\n").unwrap();
        assert_eq!(config.workspace, "ws");
        assert_eq!(config.api_root, DEFAULT_API_ROOT);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml(
            "workspace = \"file-ws\"\nusername = \"file-user\"\napp_password = \"file-pw\"\n",
        )
        .unwrap();
        config.apply_env_from(|name| match name {
            "BBR_WORKSPACE" => Some("env-ws".to_string()),
            "BBR_TIMEOUT_SECONDS" => Some("60".to_string()),
            _ => None,
        });
        assert_eq!(config.workspace, "env-ws");
        assert_eq!(config.username, "file-user");
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_unparseable_timeout_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_from(|name| {
            (name == "BBR_TIMEOUT_SECONDS").then(|| "soon".to_string())
        });
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_session_requires_credentials() {
        let config = Config::default();
        assert!(config.session().is_err());

        let config = Config {
            workspace: "ws".to_string(),
            username: "user".to_string(),
            app_password: "pw".to_string(),
            ..Default::default()
        };
        assert!(config.session().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = Config::from_toml("workspace = [broken").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration file"));
    }
}
