//! WorldClim bioclimatic variables, published as one zip archive.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use storage::{extract_zip, filename_from_url, DownloadConfig, DownloadManager};
use tracing::info;

use crate::context::Context;

/// Local archive name: the last URL segment with its first `.` replaced by
/// `-`, so `wc2.1_30s_bio.zip` becomes `wc2-1_30s_bio.zip`.
pub fn zip_name(url: &str) -> Option<String> {
    filename_from_url(url).map(|name| name.replacen('.', "-", 1))
}

/// Download the archive at `url` into `out_dir`, extract it into
/// `<out_dir>/<zip stem>` and delete the archive. Returns the extraction
/// directory.
///
/// The archive is named after the URL reached once redirects are followed.
pub async fn fetch(manager: &DownloadManager, url: &str, out_dir: &Path) -> Result<PathBuf> {
    let url = manager.final_url(url).await;
    let name = zip_name(&url).with_context(|| format!("Cannot derive a file name from {}", url))?;
    let zip_path = out_dir.join(&name);

    info!(url = %url, "Downloading WorldClim data...");
    manager.download(&url, &zip_path).await?;

    let stem = Path::new(&name)
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| name.clone().into());
    let dest = out_dir.join(stem);

    info!(dest = %dest.display(), "Unzipping...");
    let files = extract_zip(&zip_path, &dest)?;
    tokio::fs::remove_file(&zip_path).await?;

    info!(files = files.len(), "Done.");
    Ok(dest)
}

pub async fn run(ctx: &Context) -> Result<()> {
    let cfg = ctx.params().worldclim()?;
    let manager = DownloadManager::new(DownloadConfig {
        show_progress: true,
        ..Default::default()
    })?;
    fetch(&manager, &cfg.url, &ctx.resolve(&cfg.out_dir)).await?;
    Ok(())
}
