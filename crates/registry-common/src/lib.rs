//! Common types and utilities shared across the eo-registry fetchers.

pub mod bbox;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod params;

pub use bbox::BoundingBox;
pub use config::{expand_env_vars, load_yaml, project_root, resolve_path};
pub use error::{RegistryError, RegistryResult};
pub use export::{ExportParams, ExportTarget};
pub use params::{
    AlosChiliParams, CanopyHeightParams, EeParams, EsaWorldcoverParams, ExternalDataset,
    ExternalDatasets, GbifParams, GcsParams, ModisParams, Params, SoilgridsParams, TryPftsParams,
    VodcaParams, WorldclimParams,
};
