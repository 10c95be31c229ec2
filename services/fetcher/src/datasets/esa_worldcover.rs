//! ESA WorldCover land cover.

use std::path::Path;

use anyhow::{Context as _, Result};
use earth_engine::algorithms::get_ic;
use earth_engine::{export_image, Image};
use registry_common::{EsaWorldcoverParams, ExportTarget};
use tracing::info;

use crate::context::Context;

pub fn build(cfg: &EsaWorldcoverParams) -> Image {
    get_ic::<&str>(&cfg.collection_id, None, None, None, None).first()
}

/// Export name: the stem of the configured output path.
pub fn export_name(out_path: &Path) -> Result<String> {
    out_path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("out_path {} has no file name", out_path.display()))
}

pub async fn run(ctx: &Context, download: bool, dry_run: bool) -> Result<()> {
    let cfg = ctx.params().esa_worldcover()?;
    let out_path = ctx.resolve(&cfg.out_path);
    let name = export_name(&out_path)?;
    let out_dir = out_path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(out_dir).await?;

    let client = ctx.ee_client().await?;
    info!("Earth Engine initialized.");

    if cfg.export.target == ExportTarget::Gcs && !dry_run {
        client.bucket_admin()?.ensure_bucket(&cfg.export.folder).await?;
    }
    let task = export_image(&client, &build(cfg), &name, &cfg.export, dry_run).await?;

    if download {
        super::download_exports(ctx, &client, &cfg.export, vec![task], out_dir).await?;
    }
    Ok(())
}
