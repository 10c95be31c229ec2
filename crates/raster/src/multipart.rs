//! Detection and merging of tiled (multipart) exports.
//!
//! Large exports arrive as `<prefix>-<row>-<col>.tif` tiles where the
//! offsets are zero-padded, so every tile name contains `00000`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::RasterResult;
use crate::merge::merge_rasters;

const MARKER: &str = "00000";

fn files_in(dir: &Path) -> RasterResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Prefix of a tile: its stem up to the first `00000`.
fn tile_prefix(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    if !name.contains(MARKER) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.split(MARKER).next()
}

/// Unique prefixes of the multipart files in `dir`, or `None` when there
/// are none.
pub fn check_multipart_files(dir: &Path) -> RasterResult<Option<Vec<String>>> {
    let prefixes: BTreeSet<String> = files_in(dir)?
        .iter()
        .filter_map(|path| tile_prefix(path))
        .map(str::to_string)
        .collect();

    if prefixes.is_empty() {
        Ok(None)
    } else {
        Ok(Some(prefixes.into_iter().collect()))
    }
}

/// Tiles of each prefix, sorted by name.
pub fn multipart_groups(dir: &Path) -> RasterResult<BTreeMap<String, Vec<PathBuf>>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in files_in(dir)? {
        if let Some(prefix) = tile_prefix(&path) {
            groups.entry(prefix.to_string()).or_default().push(path);
        }
    }
    Ok(groups)
}

/// Name of the merged raster for a tile prefix: `bio1-` becomes `bio1.tif`.
pub fn merged_file_name(prefix: &str) -> String {
    format!("{}.tif", prefix.trim_end_matches('-'))
}

/// Merge every tile group named in `prefixes` into one raster and delete
/// the tiles. Returns the merged files.
pub fn merge_multipart_files(dir: &Path, prefixes: &[String]) -> RasterResult<Vec<PathBuf>> {
    let groups = multipart_groups(dir)?;
    let mut merged = Vec::with_capacity(prefixes.len());

    for prefix in prefixes {
        let Some(parts) = groups.get(prefix) else {
            debug!(prefix = %prefix, "No tiles left for prefix");
            continue;
        };

        let out_file = dir.join(merged_file_name(prefix));
        info!(prefix = %prefix, parts = parts.len(), out = %out_file.display(), "Merging files");
        merge_rasters(parts, &out_file)?;

        for part in parts {
            fs::remove_file(part)?;
        }
        merged.push(out_file);
    }

    Ok(merged)
}
