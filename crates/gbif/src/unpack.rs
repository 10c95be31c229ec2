//! Turn a downloaded archive into a Parquet dataset directory.

use std::fs;
use std::path::{Path, PathBuf};

use storage::{entry_names, extract_zip};
use tracing::info;

use crate::error::{GbifError, GbifResult};

/// Extract `zip_path` next to itself, rename the extracted top-level
/// directory to `<zip stem>.parquet` and delete the archive.
pub fn unzip_and_rename(zip_path: &Path) -> GbifResult<PathBuf> {
    let parent = zip_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = zip_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| GbifError::InvalidArchive(zip_path.display().to_string()))?;

    let names = entry_names(zip_path)?;
    let top = names
        .first()
        .and_then(|first| Path::new(first).components().next())
        .map(|c| c.as_os_str().to_owned())
        .ok_or_else(|| GbifError::InvalidArchive(format!("{} is empty", zip_path.display())))?;

    info!(archive = %zip_path.display(), "Extracting GBIF archive");
    extract_zip(zip_path, parent)?;

    let extracted = parent.join(&top);
    if !extracted.is_dir() {
        return Err(GbifError::InvalidArchive(format!(
            "{} has no top-level directory",
            zip_path.display()
        )));
    }

    let target = parent.join(format!("{}.parquet", stem));
    if target.exists() {
        fs::remove_dir_all(&target)?;
    }
    fs::rename(&extracted, &target)?;
    fs::remove_file(zip_path)?;

    info!(path = %target.display(), "GBIF data ready");
    Ok(target)
}
