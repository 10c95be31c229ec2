//! Typed view of `params.yaml`.
//!
//! Every fetch command reads one section. Sections are optional in the
//! file so a partial parameter file still works for the commands it
//! covers; asking for an absent section is a `MissingSection` error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bbox::BoundingBox;
use crate::config::{expand_env_vars, load_yaml};
use crate::error::{RegistryError, RegistryResult};
use crate::export::ExportParams;

/// Earth Engine project settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EeParams {
    pub project_id: String,
    /// Use the high-volume endpoint.
    #[serde(default)]
    pub high_volume: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GcsParams {
    /// Location for buckets created on demand.
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    "europe-west1".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GbifParams {
    #[serde(default = "default_gbif_query")]
    pub query: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_gbif_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_max_wait_hours")]
    pub max_wait_hours: f64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for GbifParams {
    fn default() -> Self {
        Self {
            query: default_gbif_query(),
            name: None,
            out_dir: default_gbif_out_dir(),
            max_wait_hours: default_max_wait_hours(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_gbif_query() -> PathBuf {
    PathBuf::from("references/gbif/query_all_tracheophyta.json")
}

fn default_gbif_out_dir() -> PathBuf {
    PathBuf::from("data/raw/gbif")
}

fn default_max_wait_hours() -> f64 {
    6.0
}

fn default_poll_interval_secs() -> u64 {
    60
}

/// Multi-year monthly MODIS surface reflectance means.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModisParams {
    pub product: String,
    pub date_start: String,
    pub date_end: String,
    pub qa_band: String,
    pub bands: Vec<String>,
    /// Also export an NDVI band computed from the red and NIR bands.
    #[serde(default)]
    pub ndvi: bool,
    /// Restrict the collection to images intersecting this box.
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    pub out_dir: PathBuf,
    #[serde(flatten)]
    pub export: ExportParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SoilgridsParams {
    pub collection_id: String,
    pub soil_properties: Vec<String>,
    pub soil_stat: String,
    pub out_dir: PathBuf,
    #[serde(flatten)]
    pub export: ExportParams,
}

/// Vegetation optical depth climatology.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VodcaParams {
    pub collection_base: String,
    pub bands: Vec<String>,
    pub percentiles: Vec<f64>,
    pub out_dir: PathBuf,
    #[serde(flatten)]
    pub export: ExportParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanopyHeightParams {
    pub height_collection: String,
    pub sd_collection: String,
    pub out_dir: PathBuf,
    #[serde(flatten)]
    pub export: ExportParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EsaWorldcoverParams {
    pub collection_id: String,
    /// Final raster path; its stem names the export.
    pub out_path: PathBuf,
    #[serde(flatten)]
    pub export: ExportParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlosChiliParams {
    pub collection_id: String,
    #[serde(default = "default_chili_band")]
    pub band: String,
    pub out_dir: PathBuf,
    #[serde(flatten)]
    pub export: ExportParams,
}

fn default_chili_band() -> String {
    "constant".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldclimParams {
    pub url: String,
    pub out_dir: PathBuf,
}

/// A file fetched as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalDataset {
    pub url: String,
    pub odir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalDatasets {
    #[serde(default)]
    pub to_download: Vec<String>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(flatten)]
    pub datasets: BTreeMap<String, ExternalDataset>,
}

fn default_max_concurrent() -> usize {
    4
}

impl ExternalDatasets {
    /// The datasets named in `to_download`, in that order.
    pub fn selected(&self) -> RegistryResult<Vec<(&str, &ExternalDataset)>> {
        self.to_download
            .iter()
            .map(|name| {
                self.datasets
                    .get(name)
                    .map(|ds| (name.as_str(), ds))
                    .ok_or_else(|| {
                        RegistryError::MissingParameter(format!("external_datasets.{}", name))
                    })
            })
            .collect()
    }
}

/// TRY growth-form classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TryPftsParams {
    /// Tab-separated TRY export, or a zip archive containing it.
    pub input: PathBuf,
    /// Archive member to read when `input` is a zip.
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default = "default_species_column")]
    pub species_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
    pub output: PathBuf,
}

fn default_species_column() -> String {
    "AccSpeciesName".to_string()
}

fn default_value_column() -> String {
    "OrigValueStr".to_string()
}

/// Every section of the parameter file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Params {
    pub ee: Option<EeParams>,
    pub gcs: Option<GcsParams>,
    pub gbif: Option<GbifParams>,
    pub modis: Option<ModisParams>,
    pub soilgrids: Option<SoilgridsParams>,
    pub vodca: Option<VodcaParams>,
    pub canopy_height: Option<CanopyHeightParams>,
    pub esa_worldcover: Option<EsaWorldcoverParams>,
    pub alos_chili: Option<AlosChiliParams>,
    pub worldclim: Option<WorldclimParams>,
    pub external_datasets: Option<ExternalDatasets>,
    pub try_pfts: Option<TryPftsParams>,
}

macro_rules! section_accessors {
    ($($name:ident: $ty:ty),* $(,)?) => {
        impl Params {
            $(
                pub fn $name(&self) -> RegistryResult<&$ty> {
                    Self::section(&self.$name, stringify!($name))
                }
            )*
        }
    };
}

section_accessors! {
    ee: EeParams,
    gcs: GcsParams,
    gbif: GbifParams,
    modis: ModisParams,
    soilgrids: SoilgridsParams,
    vodca: VodcaParams,
    canopy_height: CanopyHeightParams,
    esa_worldcover: EsaWorldcoverParams,
    alos_chili: AlosChiliParams,
    worldclim: WorldclimParams,
    external_datasets: ExternalDatasets,
    try_pfts: TryPftsParams,
}

impl Params {
    /// Load a parameter file, expanding `${VAR}` references first.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        load_yaml(path)
    }

    pub fn from_yaml(content: &str) -> RegistryResult<Self> {
        let expanded = expand_env_vars(content)?;
        serde_yaml::from_str(&expanded).map_err(|e| RegistryError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Unwrap a section, naming it in the error when it is absent.
    pub fn section<'a, T>(section: &'a Option<T>, name: &str) -> RegistryResult<&'a T> {
        section
            .as_ref()
            .ok_or_else(|| RegistryError::MissingSection(name.to_string()))
    }
}
