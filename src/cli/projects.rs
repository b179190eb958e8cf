//
//  bitbucket-report
//  cli/projects.rs
//

//! Projects listing command

use anyhow::Result;
use clap::Args;

use crate::command::filter::NameFilter;
use crate::command::{ExecuteOptions, Operation};

use super::{run_listing, GlobalOptions, OutputOptions};

/// List the projects of the workspace
#[derive(Args, Debug)]
pub struct ProjectsCommand {
    /// Project name filter: glob, or regex with a "regex:" prefix
    #[arg(long, short = 'f', value_name = "PATTERN")]
    pub filter: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,
}

impl ProjectsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let options = ExecuteOptions {
            name_filter: NameFilter::new(self.filter.as_deref())?,
            ..Default::default()
        };
        run_listing(
            global,
            Operation::ListProjects,
            &options,
            &self.output,
            "Projects",
        )
        .await
    }
}
