mod captions;
mod cli;
mod commands;
mod config;
mod errors;
mod images;
mod layout;
mod llm_client;
mod pipeline;
mod reddit;
mod render;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (creates the settings file on first run);
    // how it went is logged once the subscriber is up
    let mut config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    config.log_settings_origin();
    debug!(
        "Starting shreddit v{} (settings: {})",
        env!("CARGO_PKG_VERSION"),
        config.settings_path.display()
    );

    if let Err(e) = commands::run(cli.command, &mut config).await {
        error!(code = e.code(), "{e}");
        std::process::exit(e.exit_code());
    }

    Ok(())
}
