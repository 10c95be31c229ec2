//! `eo-fetch`: acquire one Earth-observation or biodiversity dataset per
//! invocation.

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{error, info};

use fetcher::cli::Cli;
use fetcher::context::Context;
use registry_common::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials and PROJECT_ROOT may come from a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(&logging::effective_level(&cli.log_level, cli.verbose), cli.log_json)
        .context("Failed to initialize logging")?;

    info!(params = %cli.params.display(), "Starting eo-fetch");
    let ctx = Context::load(&cli.params)?;

    if let Err(e) = fetcher::run(&ctx, cli.command).await {
        error!(error = %format!("{:#}", e), "Command failed");
        return Err(e);
    }
    Ok(())
}
