mod bootstrap_helpers;
mod cli_args;
mod commenter_config;
mod netrc;
mod plugin;
mod terraform_runner;

use anyhow::Result;
use clap::Parser;
use tfc_github::PublishOutcome;
use tracing::info;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::commenter_config::resolve_commenter_config;
use crate::plugin::run_plugin;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    info!(version = env!("CARGO_PKG_VERSION"), "tfplan-commenter starting");

    let config = resolve_commenter_config(&cli, |key| std::env::var(key).ok())?;
    match run_plugin(&config).await? {
        PublishOutcome::Created {
            issue_number,
            comment_id,
        } => info!(issue_number, comment_id, "plan comment created"),
        PublishOutcome::Updated { comment_id } => info!(comment_id, "plan comment updated"),
        PublishOutcome::NoTarget => info!("no open pull request for this commit, nothing posted"),
    }
    Ok(())
}
