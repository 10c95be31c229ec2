//! Image exports to Cloud Storage or Drive.

use registry_common::{ExportParams, ExportTarget};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::EarthEngineClient;
use crate::error::{EeError, EeResult};
use crate::expr::Expression;
use crate::image::{Image, ImageCollection};
use crate::task::Task;

/// Upper bound on exported pixels.
pub const MAX_PIXELS: u64 = 10_000_000_000_000;

/// Body of `projects/{project}/image:export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImageRequest {
    pub expression: Expression,
    pub description: String,
    pub file_export_options: FileExportOptions,
    /// int64 travels as a string in the REST API
    pub max_pixels: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExportOptions {
    pub file_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_storage_destination: Option<CloudStorageDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_destination: Option<DriveDestination>,
    pub geo_tiff_options: GeoTiffOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageDestination {
    pub bucket: String,
    pub filename_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDestination {
    pub folder: String,
    pub filename_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoTiffOptions {
    pub cloud_optimized: bool,
    pub skip_empty_files: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_data: Option<NoData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoData {
    pub float_value: f64,
}

impl ExportImageRequest {
    /// Build the export of `image` as a cloud-optimized GeoTIFF named
    /// `filename`. With a nodata value, masked pixels are filled with it
    /// before export.
    pub fn new(image: &Image, filename: &str, params: &ExportParams) -> EeResult<Self> {
        params.validate()?;
        if filename.trim().is_empty() {
            return Err(EeError::InvalidExport("empty filename".to_string()));
        }

        let mut image = image.clone();
        if let Some(nodata) = params.nodata {
            image = image.unmask(nodata);
        }
        let image = image
            .reproject(&params.crs, params.scale)
            .clip_to_bounds_and_scale(params.scale);

        let (cloud_storage_destination, drive_destination) = match params.target {
            ExportTarget::Gcs => (
                Some(CloudStorageDestination {
                    bucket: params.folder.clone(),
                    filename_prefix: filename.to_string(),
                }),
                None,
            ),
            ExportTarget::Drive => (
                None,
                Some(DriveDestination {
                    folder: params.folder.clone(),
                    filename_prefix: filename.to_string(),
                }),
            ),
        };

        Ok(Self {
            expression: Expression::encode(image.value()),
            description: filename.to_string(),
            file_export_options: FileExportOptions {
                file_format: "GEO_TIFF".to_string(),
                cloud_storage_destination,
                drive_destination,
                geo_tiff_options: GeoTiffOptions {
                    cloud_optimized: true,
                    skip_empty_files: true,
                    no_data: params.nodata.map(|float_value| NoData { float_value }),
                },
            },
            max_pixels: MAX_PIXELS.to_string(),
        })
    }
}

/// Export one image. In dry-run mode the request is built and logged but
/// not submitted.
pub async fn export_image(
    client: &EarthEngineClient,
    image: &Image,
    filename: &str,
    params: &ExportParams,
    dry_run: bool,
) -> EeResult<Task> {
    let request = ExportImageRequest::new(image, filename, params)?;

    info!(
        description = %filename,
        target = %params.target,
        folder = %params.folder,
        scale = params.scale,
        "Starting task{}",
        if dry_run { " (DRY RUN)" } else { "" }
    );

    if dry_run {
        return Ok(Task::unsubmitted(filename, request));
    }

    let operation = client.start_export(&request).await?;
    Ok(Task::from_operation(&operation))
}

/// Export every image of a collection, named after its first band, or with
/// `flatten` every band of every image, named after the band.
pub async fn export_collection(
    client: &EarthEngineClient,
    collection: &ImageCollection,
    params: &ExportParams,
    flatten: bool,
    dry_run: bool,
) -> EeResult<Vec<Task>> {
    if params.target == ExportTarget::Gcs && !dry_run {
        client.bucket_admin()?.ensure_bucket(&params.folder).await?;
    }

    let num_images = client.collection_size(collection).await?;
    info!(images = num_images, flatten, "Exporting collection");

    let mut tasks = Vec::new();
    for i in 0..num_images {
        let image = collection.get(num_images, i);
        let bands = client.band_names(&image).await?;

        if flatten {
            for band in &bands {
                let task = export_image(client, &image.select(&[band]), band, params, dry_run).await?;
                tasks.push(task);
            }
        } else {
            let name = bands
                .first()
                .ok_or_else(|| EeError::InvalidExport(format!("image {} has no bands", i)))?;
            tasks.push(export_image(client, &image, name, params, dry_run).await?);
        }
    }

    Ok(tasks)
}
