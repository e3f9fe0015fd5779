//! Tasklink CLI entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use tasklink::cli::commands::{self, CommandContext};
use tasklink::cli::{Cli, Commands};
use tasklink::infrastructure::logging::{LogConfig, LoggerImpl};
use tasklink::infrastructure::retry::RetryPolicy;
use tasklink::{ConfigLoader, GitHubTaskManager};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        tasklink::cli::handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    let manager = GitHubTaskManager::new(config.github.clone())
        .context("Failed to initialize GitHub client")?;
    let retry = if cli.no_retry {
        RetryPolicy::none()
    } else {
        RetryPolicy::from(&config.retry)
    };
    let ctx = CommandContext::new(Arc::new(manager), retry);

    match cli.command {
        Commands::Ticket(command) => commands::ticket::execute(command, &ctx, cli.json).await,
        Commands::Comment(command) => commands::comment::execute(command, &ctx, cli.json).await,
        Commands::Label(command) => commands::label::execute(command, &ctx, cli.json).await,
        Commands::Milestone(command) => {
            commands::milestone::execute(command, &ctx, cli.json).await
        }
        Commands::Link(command) => commands::link::execute(command, &ctx, cli.json).await,
    }
}
