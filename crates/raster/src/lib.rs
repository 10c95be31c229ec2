//! Raster post-processing for exported datasets.
//!
//! Exports larger than a single file arrive as tiles; this crate finds
//! those tiles and merges each set back into one GeoTIFF. Merging uses
//! GDAL through the default `gdal` feature.

pub mod error;
pub mod merge;
pub mod multipart;

pub use error::{RasterError, RasterResult};
pub use merge::{add_overviews, merge_rasters, DEFAULT_OVERVIEW_LEVELS, MERGE_SUPPORTED};
pub use multipart::{check_multipart_files, merge_multipart_files, merged_file_name, multipart_groups};
