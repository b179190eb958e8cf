//
//  bitbucket-report
//  cli/repos.rs
//

//! Repositories listing command

use anyhow::Result;
use clap::Args;

use crate::command::filter::NameFilter;
use crate::command::{ExecuteOptions, Operation};

use super::{run_listing, GlobalOptions, OutputOptions};

/// List the repositories of the workspace
#[derive(Args, Debug)]
pub struct ReposCommand {
    /// Repository name filter: glob, or regex with a "regex:" prefix
    #[arg(long, short = 'f', value_name = "PATTERN")]
    pub filter: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,
}

impl ReposCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let options = ExecuteOptions {
            name_filter: NameFilter::new(self.filter.as_deref())?,
            ..Default::default()
        };
        run_listing(
            global,
            Operation::ListRepositories,
            &options,
            &self.output,
            "Repositories",
        )
        .await
    }
}
