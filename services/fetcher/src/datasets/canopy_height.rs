//! ETH global canopy height (2020) and its standard deviation.

use anyhow::Result;
use earth_engine::{export_collection, Image, ImageCollection};
use registry_common::CanopyHeightParams;
use tracing::info;

use crate::context::Context;

pub const HEIGHT_BAND: &str = "ETH_GlobalCanopyHeight_2020_v1";
pub const SD_BAND: &str = "ETH_GlobalCanopyHeightSD_2020_v1";

pub fn build(cfg: &CanopyHeightParams) -> ImageCollection {
    let height = Image::load(&cfg.height_collection)
        .select(&["b1"])
        .rename(&[HEIGHT_BAND]);
    let sd = Image::load(&cfg.sd_collection).select(&["b1"]).rename(&[SD_BAND]);
    ImageCollection::from_images(vec![height, sd])
}

pub async fn run(ctx: &Context, dry_run: bool) -> Result<()> {
    let cfg = ctx.params().canopy_height()?;
    let client = ctx.ee_client().await?;

    let tasks = export_collection(&client, &build(cfg), &cfg.export, true, dry_run).await?;
    super::download_exports(ctx, &client, &cfg.export, tasks, &ctx.resolve(&cfg.out_dir)).await?;

    info!("Done.");
    Ok(())
}
