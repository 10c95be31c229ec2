//! ALOS CHILI (continuous heat-insolation load index).

use anyhow::Result;
use earth_engine::{export_collection, Image, ImageCollection};
use registry_common::AlosChiliParams;
use tracing::info;

use crate::context::Context;

pub const BAND_NAME: &str = "ALOS_CHILI_constant";

const DEBUG_SCALE: f64 = 222_000.0;
const DEBUG_OUT_DIR: &str = "debug/alos_chili";

/// Debug runs export at a coarse scale into a scratch directory.
pub fn effective_params(cfg: &AlosChiliParams, debug: bool) -> AlosChiliParams {
    let mut cfg = cfg.clone();
    if debug {
        cfg.export.scale = DEBUG_SCALE;
        cfg.out_dir = DEBUG_OUT_DIR.into();
    }
    cfg
}

pub fn build(cfg: &AlosChiliParams) -> ImageCollection {
    let image = Image::load(&cfg.collection_id)
        .select(&[&cfg.band])
        .rename(&[BAND_NAME]);
    ImageCollection::from_images(vec![image])
}

pub async fn run(ctx: &Context, debug: bool, dry_run: bool) -> Result<()> {
    let cfg = effective_params(ctx.params().alos_chili()?, debug);
    let client = ctx.ee_client().await?;

    let tasks = export_collection(&client, &build(&cfg), &cfg.export, true, dry_run).await?;
    super::download_exports(ctx, &client, &cfg.export, tasks, &ctx.resolve(&cfg.out_dir)).await?;

    info!("Done.");
    Ok(())
}
