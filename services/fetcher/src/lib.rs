//! Fetch commands for the eo-registry.
//!
//! Each subcommand acquires one dataset and writes it to the path configured
//! in the parameter file. Commands share nothing but the filesystem, so an
//! external pipeline runner can invoke them independently.

pub mod cli;
pub mod context;
pub mod datasets;
pub mod tools;

use anyhow::Result;

use cli::Commands;
use context::Context;
use datasets::gbif::GbifArgs;

/// Execute one subcommand.
pub async fn run(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Gbif { query, name, key, output } => {
            datasets::gbif::run(ctx, GbifArgs { query, name, key, output }).await
        }
        Commands::Modis { test, dry_run } => datasets::modis::run(ctx, test, dry_run).await,
        Commands::Soilgrids { download, dry_run } => {
            datasets::soilgrids::run(ctx, download, dry_run).await
        }
        Commands::Vodca { dry_run, merge_only } => {
            datasets::vodca::run(ctx, dry_run, merge_only).await
        }
        Commands::CanopyHeight { dry_run } => datasets::canopy_height::run(ctx, dry_run).await,
        Commands::EsaWorldcover { download, dry_run } => {
            datasets::esa_worldcover::run(ctx, download, dry_run).await
        }
        Commands::AlosChili { debug, dry_run } => {
            datasets::alos_chili::run(ctx, debug, dry_run).await
        }
        Commands::Worldclim => datasets::worldclim::run(ctx).await,
        Commands::Raw => datasets::raw::run(ctx).await,
        Commands::EeCollect { dataset } => tools::ee_collect(ctx, dataset).await,
        Commands::GcsDownload { bucket, local_path } => {
            tools::gcs_download(ctx, &bucket, &local_path).await
        }
        Commands::EeInfo { asset } => tools::ee_info(ctx, &asset).await,
        Commands::TryPfts { input, output } => datasets::try_pfts::run(ctx, input, output).await,
    }
}
