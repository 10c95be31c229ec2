//! Utility commands that are not tied to one dataset's fetch procedure.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use earth_engine::{download_when_complete, Image};
use registry_common::{ExportTarget, Params};
use storage::download_bucket;
use tracing::{info, warn};

use crate::cli::EeDataset;
use crate::context::Context;

/// Export bucket and local output directory of an Earth Engine dataset.
pub fn collect_target(params: &Params, dataset: EeDataset) -> Result<(String, PathBuf)> {
    let (export, out_dir) = match dataset {
        EeDataset::Modis => {
            let cfg = params.modis()?;
            (&cfg.export, cfg.out_dir.clone())
        }
        EeDataset::Soilgrids => {
            let cfg = params.soilgrids()?;
            (&cfg.export, cfg.out_dir.clone())
        }
        EeDataset::Vodca => {
            let cfg = params.vodca()?;
            (&cfg.export, cfg.out_dir.clone())
        }
        EeDataset::CanopyHeight => {
            let cfg = params.canopy_height()?;
            (&cfg.export, cfg.out_dir.clone())
        }
        EeDataset::EsaWorldcover => {
            let cfg = params.esa_worldcover()?;
            let parent = cfg.out_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (&cfg.export, parent)
        }
        EeDataset::AlosChili => {
            let cfg = params.alos_chili()?;
            (&cfg.export, cfg.out_dir.clone())
        }
    };
    if export.target == ExportTarget::Drive {
        warn!(dataset = ?dataset, "Dataset exports to Google Drive; looking in a bucket of the same name");
    }
    Ok((export.folder.clone(), out_dir))
}

/// Download the finished exports of `dataset` from its bucket.
///
/// Every export task of the project is checked, so tasks of other datasets
/// show up as missing; they are reported but do not fail the command.
pub async fn ee_collect(ctx: &Context, dataset: EeDataset) -> Result<()> {
    let (bucket, out_dir) = collect_target(ctx.params(), dataset)?;
    let out_dir = ctx.resolve(out_dir);
    let client = ctx.ee_client().await?;
    let store = ctx.blob_store(&bucket)?;

    let report = download_when_complete(&client, &store, &out_dir, None, ctx.poll_interval()).await?;
    for failed in &report.failed {
        warn!(task = %failed.id, description = %failed.description, error = %failed.message, "Task did not complete");
    }
    info!(
        downloaded = report.downloaded.len(),
        failed = report.failed.len(),
        not_in_bucket = report.missing.len(),
        "Collection finished"
    );
    Ok(())
}

pub async fn gcs_download(ctx: &Context, bucket: &str, local_path: &Path) -> Result<()> {
    let store = ctx.blob_store(bucket)?;
    let out_dir = ctx.resolve(local_path);
    let count = download_bucket(&store, &out_dir)
        .await
        .with_context(|| format!("Failed to download gs://{}", bucket))?;
    info!(bucket = %bucket, files = count, out_dir = %out_dir.display(), "Bucket downloaded");
    Ok(())
}

/// Print the CRS and affine transform of an image asset.
pub async fn ee_info(ctx: &Context, asset: &str) -> Result<()> {
    let client = ctx.ee_client().await?;
    let (crs, transform) = client.crs_and_transform(&Image::load(asset)).await?;
    println!("CRS: {}", crs);
    println!("Transform: {:?}", transform);
    Ok(())
}
