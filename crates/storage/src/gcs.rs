//! Blob access for the buckets exports land in.

use std::path::Path as FsPath;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::{gcp::GoogleCloudStorageBuilder, path::Path, ObjectStore};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::error::{StorageError, StorageResult};
use crate::transfer::partial_path;

/// Name and size of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub name: String,
    pub size: u64,
}

/// The operations the fetchers need from a bucket.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket name, for logging.
    fn bucket(&self) -> &str;

    /// Check if an object exists.
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// List objects whose names start with `prefix` (all objects when `None`).
    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<BlobMeta>>;

    /// Stream an object to a local file, returning the bytes written.
    async fn download_to(&self, name: &str, dest: &FsPath) -> StorageResult<u64>;
}

/// A GCS bucket accessed through `object_store`.
pub struct GcsStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl GcsStore {
    /// Connect to `bucket` with credentials from the environment
    /// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, ...).
    pub fn from_env(bucket: &str) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| {
                StorageError::ObjectStore(format!("Failed to create GCS client: {}", e))
            })?;

        Ok(Self {
            store: Arc::new(store),
            bucket: bucket.to_string(),
        })
    }

    /// Wrap an existing store, e.g. an in-memory one.
    pub fn with_store(bucket: &str, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for GcsStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let location = Path::from(name);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::ObjectStore(format!(
                "Failed to check {}: {}",
                name, e
            ))),
        }
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<BlobMeta>> {
        // object_store prefixes match whole path segments; export parts share a
        // name prefix within one segment, so filter on the full name instead.
        let mut blobs = Vec::new();
        let mut stream = self.store.list(None);
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| StorageError::ObjectStore(format!("List failed: {}", e)))?
        {
            let name = meta.location.to_string();
            if prefix.map_or(true, |p| name.starts_with(p)) {
                blobs.push(BlobMeta {
                    name,
                    size: meta.size as u64,
                });
            }
        }

        blobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(blobs)
    }

    #[instrument(skip(self, dest), fields(bucket = %self.bucket, dest = %dest.display()))]
    async fn download_to(&self, name: &str, dest: &FsPath) -> StorageResult<u64> {
        let location = Path::from(name);
        let result = self.store.get(&location).await?;

        let partial = partial_path(dest);
        let mut file = fs::File::create(&partial).await?;
        let mut stream = result.into_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&partial, dest).await?;

        debug!(bytes = written, "Downloaded object");
        Ok(written)
    }
}
