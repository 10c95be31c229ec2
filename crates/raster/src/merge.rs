//! Mosaicking tiles into a single GeoTIFF.

use std::path::{Path, PathBuf};

use crate::error::{RasterError, RasterResult};

/// Overview factors built on merged rasters.
pub const DEFAULT_OVERVIEW_LEVELS: [i32; 5] = [2, 4, 8, 16, 32];

/// Whether this build can merge rasters.
pub const MERGE_SUPPORTED: bool = cfg!(feature = "gdal");

/// Merge `files` into `out_file`: a tiled, ZSTD-compressed GeoTIFF with the
/// inputs' data type, nodata and spatial reference, plus average overviews.
///
/// Where tiles overlap the earlier file wins.
pub fn merge_rasters(files: &[PathBuf], out_file: &Path) -> RasterResult<()> {
    if files.is_empty() {
        return Err(RasterError::NoInputs(out_file.to_path_buf()));
    }

    #[cfg(feature = "gdal")]
    {
        gdal_impl::mosaic(files, out_file)?;
        add_overviews(out_file, &DEFAULT_OVERVIEW_LEVELS)
    }

    #[cfg(not(feature = "gdal"))]
    {
        Err(RasterError::GdalUnavailable)
    }
}

/// Build overviews with average resampling and tag them the way rasterio
/// readers expect.
pub fn add_overviews(raster_file: &Path, levels: &[i32]) -> RasterResult<()> {
    #[cfg(feature = "gdal")]
    {
        gdal_impl::overviews(raster_file, levels)
    }

    #[cfg(not(feature = "gdal"))]
    {
        let _ = (raster_file, levels);
        Err(RasterError::GdalUnavailable)
    }
}

#[cfg(feature = "gdal")]
mod gdal_impl {
    use std::path::{Path, PathBuf};

    use gdal::cpl::CslStringList;
    use gdal::raster::{GdalDataType, GdalType};
    use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags, Metadata};
    use tracing::{debug, info};

    use crate::error::{RasterError, RasterResult};

    /// Rows copied per read/write.
    const CHUNK_ROWS: usize = 1024;

    const CREATION_OPTIONS: [(&str, &str); 6] = [
        ("TILED", "YES"),
        ("BLOCKXSIZE", "256"),
        ("BLOCKYSIZE", "256"),
        ("COMPRESS", "ZSTD"),
        ("NUM_THREADS", "ALL_CPUS"),
        ("BIGTIFF", "IF_SAFER"),
    ];

    struct Tile {
        dataset: Dataset,
        origin: (f64, f64),
        size: (usize, usize),
    }

    /// Union grid of a set of north-up tiles.
    struct Grid {
        min_x: f64,
        max_y: f64,
        pixel: (f64, f64),
        cols: usize,
        rows: usize,
    }

    impl Grid {
        fn offset(&self, origin: (f64, f64)) -> (usize, usize) {
            let col = ((origin.0 - self.min_x) / self.pixel.0).round();
            let row = ((self.max_y - origin.1) / -self.pixel.1).round();
            (col.max(0.0) as usize, row.max(0.0) as usize)
        }
    }

    fn open_tiles(files: &[PathBuf]) -> RasterResult<(Vec<Tile>, Grid)> {
        let mut tiles = Vec::with_capacity(files.len());
        let mut pixel = None;
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);

        for file in files {
            let dataset = Dataset::open(file)?;
            let gt = dataset.geo_transform()?;
            if gt[2] != 0.0 || gt[4] != 0.0 {
                return Err(RasterError::Incompatible(format!(
                    "{} is rotated",
                    file.display()
                )));
            }

            let (px, py) = (gt[1], gt[5]);
            match pixel {
                None => pixel = Some((px, py)),
                Some((x, y)) if (x - px).abs() > x.abs() * 1e-9 || (y - py).abs() > y.abs() * 1e-9 => {
                    return Err(RasterError::Incompatible(format!(
                        "{} has pixel size {:?}, expected {:?}",
                        file.display(),
                        (px, py),
                        (x, y)
                    )));
                }
                Some(_) => {}
            }

            let size = dataset.raster_size();
            min_x = min_x.min(gt[0]);
            max_x = max_x.max(gt[0] + size.0 as f64 * px);
            max_y = max_y.max(gt[3]);
            min_y = min_y.min(gt[3] + size.1 as f64 * py);

            tiles.push(Tile {
                dataset,
                origin: (gt[0], gt[3]),
                size,
            });
        }

        let pixel = pixel.ok_or_else(|| RasterError::Incompatible("no tiles".to_string()))?;
        let grid = Grid {
            min_x,
            max_y,
            pixel,
            cols: ((max_x - min_x) / pixel.0).round() as usize,
            rows: ((max_y - min_y) / -pixel.1).round() as usize,
        };
        Ok((tiles, grid))
    }

    pub(super) fn mosaic(files: &[PathBuf], out_file: &Path) -> RasterResult<()> {
        let first = Dataset::open(&files[0])?;
        let band_type = first.rasterband(1)?.band_type();

        match band_type {
            GdalDataType::UInt8 => mosaic_typed::<u8>(files, out_file),
            GdalDataType::UInt16 => mosaic_typed::<u16>(files, out_file),
            GdalDataType::Int16 => mosaic_typed::<i16>(files, out_file),
            GdalDataType::UInt32 => mosaic_typed::<u32>(files, out_file),
            GdalDataType::Int32 => mosaic_typed::<i32>(files, out_file),
            GdalDataType::Float32 => mosaic_typed::<f32>(files, out_file),
            GdalDataType::Float64 => mosaic_typed::<f64>(files, out_file),
            other => Err(RasterError::Incompatible(format!(
                "unsupported data type {:?}",
                other
            ))),
        }
    }

    fn mosaic_typed<T: GdalType + Copy>(files: &[PathBuf], out_file: &Path) -> RasterResult<()> {
        let (tiles, grid) = open_tiles(files)?;
        let reference = &tiles[0].dataset;
        let band_count = reference.raster_count();

        let mut options = CslStringList::new();
        for (key, value) in CREATION_OPTIONS {
            options.set_name_value(key, value)?;
        }

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut out = driver.create_with_band_type_with_options::<T, _>(
            out_file,
            grid.cols,
            grid.rows,
            band_count,
            &options,
        )?;

        out.set_geo_transform(&[grid.min_x, grid.pixel.0, 0.0, grid.max_y, 0.0, grid.pixel.1])?;
        if let Ok(srs) = reference.spatial_ref() {
            out.set_spatial_ref(&srs)?;
        }

        for index in 1..=band_count {
            let source = reference.rasterband(index)?;
            let mut band = out.rasterband(index)?;
            if let Some(nodata) = source.no_data_value() {
                band.set_no_data_value(Some(nodata))?;
                band.fill(nodata, None)?;
            }
            if let Some(description) = source.description().ok().filter(|d| !d.is_empty()) {
                band.set_description(&description)?;
            }
        }

        info!(
            tiles = tiles.len(),
            cols = grid.cols,
            rows = grid.rows,
            out = %out_file.display(),
            "Mosaicking tiles"
        );

        // Reverse so earlier tiles overwrite later ones.
        for tile in tiles.iter().rev() {
            if tile.dataset.raster_count() != band_count {
                return Err(RasterError::Incompatible(format!(
                    "tile has {} bands, expected {}",
                    tile.dataset.raster_count(),
                    band_count
                )));
            }

            let (col, row) = grid.offset(tile.origin);
            let (width, height) = tile.size;
            debug!(col, row, width, height, "Copying tile");

            for index in 1..=band_count {
                let source = tile.dataset.rasterband(index)?;
                let mut target = out.rasterband(index)?;

                let mut y = 0;
                while y < height {
                    let rows = CHUNK_ROWS.min(height - y);
                    let mut buffer =
                        source.read_as::<T>((0, y as isize), (width, rows), (width, rows), None)?;
                    target.write((col as isize, (row + y) as isize), (width, rows), &mut buffer)?;
                    y += rows;
                }
            }
        }

        out.flush_cache()?;
        Ok(())
    }

    pub(super) fn overviews(raster_file: &Path, levels: &[i32]) -> RasterResult<()> {
        let mut dataset = Dataset::open_ex(
            raster_file,
            DatasetOptions {
                open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_RASTER,
                ..Default::default()
            },
        )?;
        dataset.build_overviews("AVERAGE", levels, &[])?;
        dataset.set_metadata_item("resampling", "average", "rio_overview")?;
        debug!(file = %raster_file.display(), ?levels, "Built overviews");
        Ok(())
    }
}
