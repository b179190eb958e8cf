//
//  bitbucket-report
//  main.rs
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitbucket_report::cli::{Cli, Commands, UsageError};
use bitbucket_report::exit_codes;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = if e.downcast_ref::<UsageError>().is_some() {
                exit_codes::USAGE
            } else {
                exit_codes::ERROR
            };
            std::process::exit(code);
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("BBR_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Projects(cmd) => cmd.run(&cli.global).await,
        Commands::Repos(cmd) => cmd.run(&cli.global).await,
        Commands::Issues(cmd) => cmd.run(&cli.global).await,
    }
}
