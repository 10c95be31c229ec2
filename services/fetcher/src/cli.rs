//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "eo-fetch")]
#[command(about = "Fetch Earth-observation and biodiversity datasets", long_about = None)]
pub struct Cli {
    /// Parameter file with one section per dataset
    #[arg(long, env = "PARAMS_FILE", default_value = "params.yaml", global = true)]
    pub params: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request (or resume) a GBIF occurrence download and unpack it
    Gbif {
        /// Query file (JSON predicate)
        #[arg(short, long)]
        query: Option<PathBuf>,

        /// Name for the downloaded files (default: the download key)
        #[arg(short, long)]
        name: Option<String>,

        /// Key of an existing download job to fetch instead of a new request
        #[arg(short, long)]
        key: Option<String>,

        /// Existing output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Multi-year monthly MODIS surface reflectance means
    Modis {
        /// Short date window at coarse resolution
        #[arg(short, long)]
        test: bool,

        /// Build export tasks without submitting them
        #[arg(long)]
        dry_run: bool,
    },

    /// SoilGrids properties at every depth
    Soilgrids {
        /// Download the exports when they finish
        #[arg(short, long)]
        download: bool,

        #[arg(long)]
        dry_run: bool,
    },

    /// VODCA vegetation optical depth climatology
    Vodca {
        #[arg(long)]
        dry_run: bool,

        /// Only merge multipart files already in the output directory
        #[arg(long)]
        merge_only: bool,
    },

    /// ETH global canopy height and its standard deviation
    CanopyHeight {
        #[arg(long)]
        dry_run: bool,
    },

    /// ESA WorldCover land cover
    EsaWorldcover {
        /// Download the export when it finishes
        #[arg(short, long)]
        download: bool,

        #[arg(long)]
        dry_run: bool,
    },

    /// ALOS CHILI topographic index
    AlosChili {
        /// Coarse export into a debug directory
        #[arg(long)]
        debug: bool,

        #[arg(long)]
        dry_run: bool,
    },

    /// WorldClim bioclimatic variables
    Worldclim,

    /// Static files listed under `external_datasets.to_download`
    Raw,

    /// Download finished exports of a dataset from its bucket
    EeCollect {
        #[arg(value_enum)]
        dataset: EeDataset,
    },

    /// Download every blob of a bucket
    GcsDownload {
        bucket: String,
        local_path: PathBuf,
    },

    /// Print the CRS and transform of an image asset
    EeInfo { asset: String },

    /// Assign plant functional types to TRY species
    TryPfts {
        /// TRY export (tab-separated text or zip)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Datasets exported through Earth Engine.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EeDataset {
    Modis,
    Soilgrids,
    Vodca,
    CanopyHeight,
    EsaWorldcover,
    AlosChili,
}
