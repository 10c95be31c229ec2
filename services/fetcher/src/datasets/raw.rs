//! Static files fetched as-is.

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use registry_common::ExternalDatasets;
use storage::{filename_from_url, DownloadConfig, DownloadManager};
use tracing::info;

use crate::context::Context;

/// `(url, destination)` for every selected dataset.
pub fn download_jobs(ctx: &Context, datasets: &ExternalDatasets) -> Result<Vec<(String, PathBuf)>> {
    datasets
        .selected()?
        .into_iter()
        .map(|(name, ds)| {
            let file = filename_from_url(&ds.url)
                .with_context(|| format!("{}: cannot derive a file name from {}", name, ds.url))?;
            Ok((ds.url.clone(), ctx.resolve(&ds.odir).join(file)))
        })
        .collect()
}

pub async fn fetch(ctx: &Context, manager: &DownloadManager) -> Result<Vec<PathBuf>> {
    let datasets = ctx.params().external_datasets()?;
    let jobs = download_jobs(ctx, datasets)?;
    if jobs.is_empty() {
        info!("No external datasets selected");
        return Ok(Vec::new());
    }

    info!(count = jobs.len(), max_concurrent = datasets.max_concurrent, "Downloading external datasets...");
    let results = manager.download_many(jobs, datasets.max_concurrent).await;

    let total = results.len();
    let failed: Vec<String> = results
        .iter()
        .filter(|(_, result)| result.is_err())
        .map(|(url, _)| url.clone())
        .collect();
    if !failed.is_empty() {
        bail!("{} of {} downloads failed: {}", failed.len(), total, failed.join(", "));
    }
    Ok(results.into_iter().filter_map(|(_, result)| result.ok()).collect())
}

pub async fn run(ctx: &Context) -> Result<()> {
    let manager = DownloadManager::new(DownloadConfig::default())?;
    let saved = fetch(ctx, &manager).await?;
    info!(files = saved.len(), "Done.");
    Ok(())
}
