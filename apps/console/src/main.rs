//! GalleryDesk console entry point.

mod cli;
mod commands;
mod config;
mod transport;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::ConsoleConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gallerydesk=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting GalleryDesk console");

    let mut config = match ConsoleConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            ConsoleConfig::default()
        }
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    tracing::debug!(api = %config.api_base_url, "configuration loaded");

    commands::run(cli.command, &config).await
}
