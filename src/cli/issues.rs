//
//  bitbucket-report
//  cli/issues.rs
//

//! Issues listing command
//!
//! Issues are read from every repository of the workspace whose issue
//! tracker is enabled (optionally narrowed with `--repo-filter`), then
//! filtered and sorted into one combined report.

use anyhow::Result;
use clap::{ArgAction, Args};

use crate::command::filter::{IssueFilter, NameFilter};
use crate::command::{ExecuteOptions, Operation};

use super::{run_listing, GlobalOptions, OutputOptions};

/// List the issues of the workspace's repositories
#[derive(Args, Debug)]
pub struct IssuesCommand {
    /// Issue title filter: glob, or regex with a "regex:" prefix
    #[arg(long, short = 'f', value_name = "PATTERN")]
    pub filter: Option<String>,

    /// Repository name filter: glob, or regex with a "regex:" prefix
    #[arg(long, value_name = "PATTERN")]
    pub repo_filter: Option<String>,

    /// Only issues assigned to this exact display name
    #[arg(long, value_name = "NAME")]
    pub assignee: Option<String>,

    /// Include issues in an open state (new, open)
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub include_open: bool,

    /// Include issues in a closed state
    #[arg(long, value_name = "BOOL", default_value_t = false, action = ArgAction::Set)]
    pub include_closed: bool,

    /// Embedded issue properties to add as columns
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub properties: Vec<String>,

    #[command(flatten)]
    pub output: OutputOptions,
}

impl IssuesCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let options = ExecuteOptions {
            name_filter: NameFilter::new(self.repo_filter.as_deref())?,
            issue_filter: IssueFilter {
                title: NameFilter::new(self.filter.as_deref())?,
                assignee: self.assignee.clone(),
                include_open: self.include_open,
                include_closed: self.include_closed,
            },
            properties: self.properties.clone(),
        };
        run_listing(
            global,
            Operation::ListRepositoryIssues,
            &options,
            &self.output,
            "RepositoryIssues",
        )
        .await
    }
}
