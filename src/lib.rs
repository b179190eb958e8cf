//
//  bitbucket-report
//  lib.rs
//

//! # bitbucket-report
//!
//! Library behind the `bbr` command line tool: list the projects,
//! repositories, and repository issues of a Bitbucket Cloud workspace, with
//! filtering, a composite issue sort, and terminal-table or CSV output.
//!
//! ## Modules
//!
//! - [`session`]: Workspace identity and Basic-auth credentials
//! - [`config`]: TOML configuration with environment overrides
//! - [`api`]: Typed records, pagination, and the HTTP client
//! - [`command`]: Listing operations, filters, and orchestration
//! - [`output`]: Table sink, terminal rendering, and CSV output
//! - [`cli`]: clap command definitions

pub mod api;
pub mod cli;
pub mod command;
pub mod config;
pub mod output;
pub mod session;

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process exit codes.
pub mod exit_codes {
    /// The listing completed.
    pub const SUCCESS: i32 = 0;
    /// A runtime failure: configuration, network, or server error.
    pub const ERROR: i32 = 1;
    /// The request itself was malformed, e.g. a non-CSV output file.
    pub const USAGE: i32 = 2;
}
