//! Download helpers for exported blobs.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{error, info, warn};

use crate::error::StorageResult;
use crate::gcs::BlobStore;

/// What `download_blob_if_exists` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobFetch {
    /// The single-file export was downloaded.
    Downloaded(PathBuf),
    /// The file was already present locally and overwriting was off.
    Skipped(PathBuf),
    /// The export was split into parts; all parts were downloaded.
    Multipart(Vec<PathBuf>),
    /// Nothing matching was found in the bucket.
    NotFound,
}

/// The last path segment of a blob name.
pub fn blob_basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Download a blob into `out_dir`, replacing any existing file of the same name.
pub async fn download_blob(
    store: &dyn BlobStore,
    name: &str,
    out_dir: &Path,
) -> StorageResult<PathBuf> {
    let basename = blob_basename(name);
    info!(blob = %basename, out_dir = %out_dir.display(), "Downloading blob");

    let out_path = out_dir.join(basename);
    if fs::try_exists(&out_path).await? {
        warn!(
            file = %basename,
            path = %out_path.display(),
            "File already exists. Overwriting..."
        );
        fs::remove_file(&out_path).await?;
    }

    store.download_to(name, &out_path).await?;
    Ok(out_path)
}

/// Download several blobs one after another.
pub async fn download_blobs(
    store: &dyn BlobStore,
    names: &[String],
    out_dir: &Path,
) -> StorageResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        info!(blob = %name, "Downloading blob ({}/{})", i + 1, names.len());
        paths.push(download_blob(store, name, out_dir).await?);
    }
    Ok(paths)
}

/// Download `<file_stem>.tif` if the bucket has it. Large exports are split
/// into `<file_stem>-<row>-<col>.tif` parts; those are downloaded instead
/// when the single file is missing. Parts are listed under `<file_stem>-`
/// so that `bio1` does not pick up the tiles of `bio10`.
pub async fn download_blob_if_exists(
    store: &dyn BlobStore,
    file_stem: &str,
    out_dir: &Path,
    overwrite: bool,
) -> StorageResult<BlobFetch> {
    let file_name = format!("{}.tif", file_stem);
    let local_path = out_dir.join(&file_name);

    if store.exists(&file_name).await? {
        if overwrite || !fs::try_exists(&local_path).await? {
            let path = download_blob(store, &file_name, out_dir).await?;
            return Ok(BlobFetch::Downloaded(path));
        }
        info!(
            file = %file_name,
            out_dir = %out_dir.display(),
            "File already exists. Skipping download..."
        );
        return Ok(BlobFetch::Skipped(local_path));
    }

    warn!(
        file = %file_name,
        bucket = %store.bucket(),
        "File not found in bucket. Checking if split into parts..."
    );
    let parts: Vec<String> = store
        .list(Some(&format!("{}-", file_stem)))
        .await?
        .into_iter()
        .map(|blob| blob.name)
        .collect();

    if parts.is_empty() {
        error!(file = %file_name, bucket = %store.bucket(), "File not found in bucket");
        return Ok(BlobFetch::NotFound);
    }

    let paths = download_blobs(store, &parts, out_dir).await?;
    Ok(BlobFetch::Multipart(paths))
}

/// Download every blob in the bucket into `out_dir`.
pub async fn download_bucket(store: &dyn BlobStore, out_dir: &Path) -> StorageResult<usize> {
    fs::create_dir_all(out_dir).await?;
    let blobs = store.list(None).await?;

    info!(
        bucket = %store.bucket(),
        out_dir = %out_dir.display(),
        count = blobs.len(),
        "Downloading files from bucket"
    );

    let progress = ProgressBar::new(blobs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );

    for blob in &blobs {
        progress.set_message(blob_basename(&blob.name).to_string());
        download_blob(store, &blob.name, out_dir).await?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(blobs.len())
}
