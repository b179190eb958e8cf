//
//  bitbucket-report
//  cli/mod.rs
//

//! CLI command definitions using clap derive macros

mod issues;
mod projects;
mod repos;

pub use issues::IssuesCommand;
pub use projects::ProjectsCommand;
pub use repos::ReposCommand;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use thiserror::Error;

use crate::api::BitbucketClient;
use crate::command::{self, ExecuteOptions, Operation};
use crate::config::Config;
use crate::output::{csv, DataTable};

/// Error that should be reported as a usage problem rather than a runtime
/// failure. The process exits with [`crate::exit_codes::USAGE`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Bitbucket workspace reporting from the command line
#[derive(Parser, Debug)]
#[command(
    name = "bbr",
    version,
    about = "Report on Bitbucket Cloud projects, repositories, and issues",
    long_about = "bbr lists the projects, repositories, and repository issues of a\n\
                  Bitbucket Cloud workspace, with filtering and CSV output.",
    propagate_version = true,
    after_help = "Use 'bbr <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Workspace ID to query
    #[arg(long, short = 'w', global = true, env = "BBR_WORKSPACE")]
    pub workspace: Option<String>,

    /// Service root URL
    #[arg(long, global = true, env = "BBR_API_ROOT")]
    pub api_root: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Output options shared by the listing commands
#[derive(Args, Debug, Clone, Default)]
pub struct OutputOptions {
    /// Write results to this CSV file instead of the terminal
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Append to the output file instead of overwriting it
    #[arg(long, requires = "output_file")]
    pub append: bool,

    /// Identifier of the result table
    #[arg(long, value_name = "ID")]
    pub table_id: Option<String>,

    /// Print NAME=<row count> after the listing
    #[arg(long, value_name = "NAME")]
    pub count_property: Option<String>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the projects of the workspace
    #[command(visible_alias = "proj")]
    Projects(ProjectsCommand),

    /// List the repositories of the workspace
    #[command(visible_alias = "r")]
    Repos(ReposCommand),

    /// List the issues of the workspace's repositories
    #[command(visible_alias = "i")]
    Issues(IssuesCommand),
}

/// Resolves the effective configuration: file, environment, then options.
fn resolve_config(global: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(workspace) = &global.workspace {
        config.workspace = workspace.clone();
    }
    if let Some(api_root) = &global.api_root {
        config.api_root = api_root.clone();
    }
    if let Some(timeout) = global.timeout {
        config.timeout_seconds = timeout;
    }
    Ok(config)
}

/// Builds the API client from the resolved configuration.
fn build_client(global: &GlobalOptions) -> Result<BitbucketClient> {
    let config = resolve_config(global)?;
    let session = config.session()?;
    BitbucketClient::new(session, &config.api_root, config.timeout())
}

/// Runs one listing operation end to end.
///
/// Validates the output path up front so a bad `--output-file` is a usage
/// error before any network traffic, then fetches, fills the table, and
/// either renders it to the terminal or writes the CSV file. The count
/// property, when requested, is printed last as `NAME=<rows>`.
pub(crate) async fn run_listing(
    global: &GlobalOptions,
    operation: Operation,
    options: &ExecuteOptions,
    output: &OutputOptions,
    default_table_id: &str,
) -> Result<()> {
    if let Some(path) = &output.output_file {
        csv::validate_csv_path(path).map_err(|e| UsageError(format!("{e:#}")))?;
    }

    let client = build_client(global)?;
    let table_id = output.table_id.as_deref().unwrap_or(default_table_id);
    let mut table = DataTable::new(table_id);

    let count = command::execute(&client, operation, options, &mut table).await?;

    match &output.output_file {
        Some(path) => {
            csv::write_csv(&table, path, output.append)?;
            println!(
                "{}",
                style(format!("Wrote {} rows to {}", count, path.display())).dim()
            );
        }
        None => {
            println!("{}", table.render());
            println!("{}", style(format!("{count} rows")).dim());
        }
    }

    if let Some(name) = &output.count_property {
        println!("{name}={count}");
    }

    Ok(())
}
