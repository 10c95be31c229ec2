//! Storage and transfer helpers for the eo-registry fetchers.
//!
//! Provides unified interfaces for:
//! - Google credentials (access token sources)
//! - Google Cloud Storage buckets used as export landing zones
//! - Resumable HTTP downloads from static file servers
//! - Zip archive extraction

pub mod archive;
pub mod auth;
pub mod blobs;
pub mod bucket;
pub mod error;
pub mod gcs;
pub mod transfer;

pub use archive::{entry_names, extract_zip, read_entry};
pub use auth::{default_token_source, EnvToken, GcloudToken, StaticToken, TokenSource};
pub use blobs::{
    download_blob, download_blob_if_exists, download_blobs, download_bucket, BlobFetch,
};
pub use bucket::{BucketAdmin, BucketStatus};
pub use error::{StorageError, StorageResult};
pub use gcs::{BlobMeta, BlobStore, GcsStore};
pub use transfer::{filename_from_url, DownloadConfig, DownloadManager, DownloadProgress};
