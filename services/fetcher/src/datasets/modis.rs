//! Multi-year monthly means of MODIS Terra surface reflectance.

use anyhow::Result;
use earth_engine::algorithms::{
    add_ndvi, calculate_monthly_averages, get_ic, mask_and_cast_int16, mask_clouds, year_of,
    INT16_NODATA,
};
use earth_engine::{export_collection, Geometry, ImageCollection};
use registry_common::{ExportParams, ModisParams};
use tracing::info;

use crate::context::Context;

const TEST_DATE_START: &str = "2021-01-01";
const TEST_DATE_END: &str = "2022-01-31";
const TEST_SCALE: f64 = 112_000.0;

/// Parameters for this run; test mode shrinks the window and coarsens the
/// resolution.
pub fn effective_params(cfg: &ModisParams, test: bool) -> ModisParams {
    let mut cfg = cfg.clone();
    if test {
        cfg.date_start = TEST_DATE_START.to_string();
        cfg.date_end = TEST_DATE_END.to_string();
        cfg.export.scale = TEST_SCALE;
    }
    cfg
}

/// Export settings; int16 exports always carry the int16 nodata value.
pub fn export_params(cfg: &ModisParams) -> ExportParams {
    let mut export = cfg.export.clone();
    export.nodata = Some(export.nodata.unwrap_or(INT16_NODATA));
    export
}

/// Cloud-masked monthly means, one int16 image per band and month.
pub fn build(cfg: &ModisParams) -> ImageCollection {
    let ic = get_ic::<&str>(
        &cfg.product,
        Some(cfg.date_start.as_str()),
        Some(cfg.date_end.as_str()),
        None,
        cfg.bbox.as_ref().map(Geometry::from),
    );
    let mut ic = mask_clouds(&ic, &cfg.qa_band).select(&cfg.bands);

    let mut bands = cfg.bands.clone();
    if cfg.ndvi {
        ic = add_ndvi(&ic);
        bands.push("ndvi".to_string());
    }

    let monthly = calculate_monthly_averages(
        &ic,
        &bands,
        year_of(&cfg.date_start),
        year_of(&cfg.date_end),
    );
    mask_and_cast_int16(&monthly)
}

pub async fn run(ctx: &Context, test: bool, dry_run: bool) -> Result<()> {
    let cfg = effective_params(ctx.params().modis()?, test);
    if test {
        info!(start = %cfg.date_start, end = %cfg.date_end, scale = cfg.export.scale, "Running in test mode");
    }
    let out_dir = ctx.resolve(&cfg.out_dir);

    let client = ctx.ee_client().await?;

    info!("Getting MODIS Terra surface reflectance data");
    let ic = build(&cfg);

    info!("Processing into monthly averages and exporting...");
    let export = export_params(&cfg);
    let tasks = export_collection(&client, &ic, &export, true, dry_run).await?;

    info!("Downloading from Google Cloud Storage...");
    super::download_exports(ctx, &client, &export, tasks, &out_dir).await?;

    info!("Done.");
    Ok(())
}
