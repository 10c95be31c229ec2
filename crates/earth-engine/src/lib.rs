//! Earth Engine access for the dataset fetchers.
//!
//! Builds computations as expression graphs, submits GeoTIFF exports to
//! Cloud Storage or Drive through the REST API, and waits for the resulting
//! tasks so their files can be downloaded.
//!
//! ```ignore
//! let client = ee_init("my-project", false).await?;
//! let image = Image::load("CSP/ERGo/1_0/Global/ALOS_CHILI").select(&["constant"]);
//! let task = export_image(&client, &image, "chili", &ExportParams::default(), false).await?;
//! ```

pub mod algorithms;
pub mod client;
pub mod error;
pub mod export;
pub mod expr;
pub mod image;
pub mod monitor;
pub mod task;

pub use client::{ee_init, EarthEngineClient, Operation, HIGH_VOLUME_URL, STANDARD_URL};
pub use error::{EeError, EeResult};
pub use export::{export_collection, export_image, ExportImageRequest};
pub use expr::{Expression, Value};
pub use image::{Filter, Geometry, Image, ImageCollection, Reducer};
pub use monitor::{download_when_complete, FailedTask, MonitorReport, DEFAULT_POLL_INTERVAL};
pub use task::{Task, TaskState};
