//! GBIF occurrence downloads.
//!
//! Requests a Parquet export for a predicate query, waits for the job to
//! finish, saves the archive with its metadata and unpacks it into a
//! `<name>.parquet` directory.

pub mod client;
pub mod error;
pub mod status;
pub mod unpack;

pub use client::{Credentials, GbifClient, DEFAULT_BASE_URL, DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL};
pub use error::{GbifError, GbifResult};
pub use status::DownloadStatus;
pub use unpack::unzip_and_rename;
