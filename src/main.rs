use anyhow::{Context, Result};
use clap::Parser;
use inactive_users::core::cli::Cli;
use inactive_users::core::config::Config;
use inactive_users::core::startup;
use inactive_users::core::tracing_init::init_tracing;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from '{}'", path.display()))?,
        None => Config::default(),
    };

    // Load and validate configuration
    let config = cli.apply(base);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging);

    // Rows are handled strictly one after another
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let summary = runtime.block_on(startup::run(&config))?;

    // Row failures are logged but never change the exit status
    info!(failed_rows = summary.failed, "Exiting");

    Ok(())
}
