//! One module per dataset. Earth Engine datasets split into a pure
//! `build` step producing the computation and an async `run` step that
//! exports and downloads it.

pub mod alos_chili;
pub mod canopy_height;
pub mod esa_worldcover;
pub mod gbif;
pub mod modis;
pub mod raw;
pub mod soilgrids;
pub mod try_pfts;
pub mod vodca;
pub mod worldclim;

use std::path::Path;

use anyhow::{bail, Result};
use earth_engine::{download_when_complete, EarthEngineClient, MonitorReport, Task, TaskState};
use registry_common::{ExportParams, ExportTarget};
use tracing::info;

use crate::context::Context;

/// Wait for `tasks` and download their outputs from the export bucket.
///
/// Nothing is downloaded for dry runs or Drive exports.
pub(crate) async fn download_exports(
    ctx: &Context,
    client: &EarthEngineClient,
    export: &ExportParams,
    tasks: Vec<Task>,
    out_dir: &Path,
) -> Result<()> {
    if tasks.iter().all(|task| task.state == TaskState::Unsubmitted) {
        info!(tasks = tasks.len(), "Dry run, nothing to download");
        return Ok(());
    }
    if export.target == ExportTarget::Drive {
        info!(folder = %export.folder, "Exports go to Google Drive; skipping download");
        return Ok(());
    }

    let store = ctx.blob_store(&export.folder)?;
    let report =
        download_when_complete(client, &store, out_dir, Some(tasks), ctx.poll_interval()).await?;
    ensure_complete(&report)
}

/// Fail when any task failed or produced nothing.
pub(crate) fn ensure_complete(report: &MonitorReport) -> Result<()> {
    if report.all_succeeded() {
        return Ok(());
    }
    bail!(
        "{} export(s) failed and {} output(s) were missing from the bucket",
        report.failed.len(),
        report.missing.len()
    )
}
