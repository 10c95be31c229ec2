//! VODCA vegetation optical depth: mean and percentiles per band.

use anyhow::{bail, Result};
use earth_engine::{export_collection, Image, ImageCollection, Reducer};
use raster::{check_multipart_files, merge_multipart_files, MERGE_SUPPORTED};
use registry_common::VodcaParams;
use tracing::info;

use crate::context::Context;

/// Output band prefix for a VODCA band: `X-band` becomes `vodca_x-band`.
pub fn band_name(band: &str) -> String {
    format!("vodca_{}", band.to_lowercase())
}

/// One image per band holding the mean and percentiles of the bilinearly
/// resampled series, clamped to [0, 1].
pub fn build(cfg: &VodcaParams) -> ImageCollection {
    let images: Vec<Image> = cfg
        .bands
        .iter()
        .map(|band| {
            let name = band_name(band);
            let ic = ImageCollection::load(&format!("{}/{}", cfg.collection_base, band))
                .select(&["b1"])
                .map(move |image| image.select(&["b1"]).rename(&[name]))
                .map(|image| image.resample("bilinear"));

            let mean = ic.reduce(Reducer::mean());
            let percentiles = ic.reduce(Reducer::percentile(&cfg.percentiles));
            mean.add_bands(&percentiles).clamp(0.0, 1.0)
        })
        .collect();
    ImageCollection::from_images(images)
}

pub async fn run(ctx: &Context, dry_run: bool, merge_only: bool) -> Result<()> {
    let cfg = ctx.params().vodca()?;
    let out_dir = ctx.resolve(&cfg.out_dir);
    if !dry_run {
        ensure_merge_supported()?;
    }

    if !merge_only {
        let client = ctx.ee_client().await?;

        info!("Preprocessing VODCA dataset...");
        let ic = build(cfg);

        info!("Exporting VODCA dataset to Google Cloud Storage...");
        let tasks = export_collection(&client, &ic, &cfg.export, true, dry_run).await?;

        if !dry_run {
            info!("Downloading data from Google Cloud Storage...");
            super::download_exports(ctx, &client, &cfg.export, tasks, &out_dir).await?;
        }
    }

    if !dry_run {
        merge_outputs(&out_dir)?;
    }

    info!("Done.");
    Ok(())
}

/// Fail before any export is submitted when the tiles could not be merged.
pub fn ensure_merge_supported() -> Result<()> {
    if !MERGE_SUPPORTED {
        bail!("eo-fetch was built without the `gdal` feature; VODCA tiles cannot be merged");
    }
    Ok(())
}

/// Merge any multipart exports sitting in `out_dir`.
pub fn merge_outputs(out_dir: &std::path::Path) -> Result<()> {
    if !out_dir.is_dir() {
        return Ok(());
    }
    if let Some(prefixes) = check_multipart_files(out_dir)? {
        info!(groups = prefixes.len(), "Multipart files detected. Merging...");
        merge_multipart_files(out_dir, &prefixes)?;
    }
    Ok(())
}
