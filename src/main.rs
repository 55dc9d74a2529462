use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod handlers;
mod router;
mod schemas;

#[cfg(test)]
mod test_utils;

use cli::Cli;

/// Main entry point for the userbase application.
#[tokio::main]
async fn main() -> Result<()> {
    let env_file = config::load_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userbase=debug,accounts=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = env_file {
        debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
