//! Error types for raster post-processing.

use std::path::PathBuf;

use thiserror::Error;

pub type RasterResult<T> = Result<T, RasterError>;

#[derive(Error, Debug)]
pub enum RasterError {
    /// Nothing to merge.
    #[error("no input rasters for {0}")]
    NoInputs(PathBuf),

    /// Inputs cannot be mosaicked together.
    #[error("incompatible rasters: {0}")]
    Incompatible(String),

    /// Built without the `gdal` feature.
    #[error("raster merging requires the `gdal` feature")]
    GdalUnavailable,

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
