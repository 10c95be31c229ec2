//! SoilGrids soil properties, one export per depth band.

use anyhow::Result;
use earth_engine::{export_image, Image, Task};
use registry_common::{ExportTarget, SoilgridsParams};
use tracing::info;

use crate::context::Context;

/// Asset of one property/statistic pair, e.g. `.../soc_mean`.
pub fn asset_id(cfg: &SoilgridsParams, property: &str) -> String {
    format!("{}/{}_{}", cfg.collection_id, property, cfg.soil_stat)
}

pub async fn run(ctx: &Context, download: bool, dry_run: bool) -> Result<()> {
    let cfg = ctx.params().soilgrids()?;
    let client = ctx.ee_client().await?;

    if cfg.export.target == ExportTarget::Gcs && !dry_run {
        client.bucket_admin()?.ensure_bucket(&cfg.export.folder).await?;
    }

    info!("Exporting SoilGrids images to Google Cloud Storage...");
    let mut tasks: Vec<Task> = Vec::new();
    for property in &cfg.soil_properties {
        let image = Image::load(&asset_id(cfg, property));
        for band in client.band_names(&image).await? {
            let task = export_image(&client, &image.select(&[&band]), &band, &cfg.export, dry_run).await?;
            tasks.push(task);
        }
    }

    if download && !dry_run {
        info!("Downloading images from Google Cloud Storage...");
        let out_dir = ctx.resolve(&cfg.out_dir);
        super::download_exports(ctx, &client, &cfg.export, tasks, &out_dir).await?;
    }
    Ok(())
}
