//! Bucket validation through the Cloud Storage JSON API.
//!
//! `object_store` has no bucket management, so existence checks and creation
//! go straight to `storage/v1/b`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::auth::TokenSource;
use crate::error::{StorageError, StorageResult};

/// Default Cloud Storage API root.
pub const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com";

/// Location new buckets are created in.
pub const DEFAULT_BUCKET_LOCATION: &str = "europe-west1";

/// Outcome of `ensure_bucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Existing,
    Created,
}

/// Checks that export buckets exist and creates them when they don't.
pub struct BucketAdmin {
    client: Client,
    base_url: String,
    project: String,
    location: String,
    tokens: Arc<dyn TokenSource>,
}

impl BucketAdmin {
    pub fn new(project: &str, tokens: Arc<dyn TokenSource>) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_STORAGE_URL.to_string(),
            project: project.to_string(),
            location: DEFAULT_BUCKET_LOCATION.to_string(),
            tokens,
        })
    }

    /// Point at a different API root (used by tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Create missing buckets in `location` instead of the default.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    /// Make sure `bucket` exists, creating a private bucket if it doesn't.
    #[instrument(skip(self), fields(project = %self.project))]
    pub async fn ensure_bucket(&self, bucket: &str) -> StorageResult<BucketStatus> {
        let token = self.tokens.access_token().await?;

        info!(bucket = %bucket, "Getting bucket");
        let response = self
            .client
            .get(format!("{}/storage/v1/b/{}", self.base_url, bucket))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(BucketStatus::Existing),
            StatusCode::NOT_FOUND => {
                warn!(bucket = %bucket, "Bucket not found. Creating...");
                self.create_bucket(bucket, &token).await?;
                Ok(BucketStatus::Created)
            }
            StatusCode::FORBIDDEN => Err(StorageError::Forbidden(bucket.to_string())),
            status => Err(StorageError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            }),
        }
    }

    async fn create_bucket(&self, bucket: &str, token: &str) -> StorageResult<()> {
        let response = self
            .client
            .post(format!("{}/storage/v1/b", self.base_url))
            .query(&[("project", self.project.as_str()), ("predefinedAcl", "private")])
            .bearer_auth(token)
            .json(&json!({ "name": bucket, "location": self.location }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                info!(bucket = %bucket, location = %self.location, "Created bucket");
                Ok(())
            }
            StatusCode::FORBIDDEN | StatusCode::CONFLICT => {
                Err(StorageError::Forbidden(bucket.to_string()))
            }
            status => Err(StorageError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            }),
        }
    }
}
