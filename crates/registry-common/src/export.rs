//! Export parameters shared by every Earth Engine dataset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Where an export lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportTarget {
    /// A Google Cloud Storage bucket.
    #[default]
    #[serde(rename = "gcs")]
    Gcs,
    /// A Google Drive folder.
    #[serde(rename = "gdrive")]
    Drive,
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTarget::Gcs => f.write_str("gcs"),
            ExportTarget::Drive => f.write_str("gdrive"),
        }
    }
}

impl FromStr for ExportTarget {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gcs" => Ok(ExportTarget::Gcs),
            "gdrive" => Ok(ExportTarget::Drive),
            other => Err(RegistryError::invalid(
                "target",
                format!("'{}'. Use 'gcs' or 'gdrive'.", other),
            )),
        }
    }
}

/// Projection, resolution and destination of an image export.
///
/// `folder` is the bucket name for GCS exports and the folder name for Drive
/// exports. Parameter files call it `bucket`; `folder` is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportParams {
    #[serde(default = "default_crs")]
    pub crs: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub target: ExportTarget,
    #[serde(default = "default_folder", rename = "bucket", alias = "folder")]
    pub folder: String,
    #[serde(default)]
    pub nodata: Option<f64>,
}

fn default_crs() -> String {
    "EPSG:4326".to_string()
}

fn default_scale() -> f64 {
    1000.0
}

fn default_folder() -> String {
    "gee_exports".to_string()
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            crs: default_crs(),
            scale: default_scale(),
            target: ExportTarget::default(),
            folder: default_folder(),
            nodata: None,
        }
    }
}

impl ExportParams {
    /// Check the values a parameter file could get wrong.
    pub fn validate(&self) -> RegistryResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(RegistryError::invalid(
                "scale",
                format!("must be a positive number of meters, got {}", self.scale),
            ));
        }
        if self.folder.trim().is_empty() {
            return Err(RegistryError::MissingParameter("bucket".to_string()));
        }
        if self.crs.trim().is_empty() {
            return Err(RegistryError::MissingParameter("crs".to_string()));
        }
        Ok(())
    }

    /// Same parameters at a different scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}
