//! Occurrence-download API client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::{json, Value};
use storage::{DownloadConfig, DownloadManager};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::error::{GbifError, GbifResult};
use crate::status::DownloadStatus;

pub const DEFAULT_BASE_URL: &str = "https://api.gbif.org/v1";

/// Give up on a pending job after this long.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(6 * 60 * 60);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Account used to request downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub email: String,
}

impl Credentials {
    /// Read `GBIF_USER`, `GBIF_PWD` and `GBIF_EMAIL`.
    pub fn from_env() -> GbifResult<Self> {
        let var = |name: &'static str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(GbifError::MissingCredentials(name))
        };
        Ok(Self {
            user: var("GBIF_USER")?,
            password: var("GBIF_PWD")?,
            email: var("GBIF_EMAIL")?,
        })
    }
}

pub struct GbifClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
    download_config: DownloadConfig,
}

impl GbifClient {
    pub fn new(credentials: Option<Credentials>) -> GbifResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GbifError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            download_config: DownloadConfig {
                show_progress: true,
                ..Default::default()
            },
        })
    }

    /// Client with credentials from the environment. Missing credentials
    /// only matter when a new download is requested.
    pub fn from_env() -> GbifResult<Self> {
        let credentials = match Credentials::from_env() {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!(error = %e, "GBIF credentials not configured");
                None
            }
        };
        Self::new(credentials)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_download_config(mut self, config: DownloadConfig) -> Self {
        self.download_config = config;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Request a new Parquet download for `query` and return its key.
    ///
    /// `query` is either a bare predicate or an object with a `predicate`
    /// member.
    #[instrument(skip_all)]
    pub async fn init_download(&self, query: &Value) -> GbifResult<String> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(GbifError::MissingCredentials("GBIF_USER"))?;

        let predicate = query.get("predicate").unwrap_or(query);
        let body = json!({
            "creator": credentials.user,
            "notificationAddresses": [credentials.email],
            "sendNotification": true,
            "format": "SIMPLE_PARQUET",
            "predicate": predicate,
        });

        let response = self
            .http
            .post(self.url("occurrence/download/request"))
            .basic_auth(&credentials.user, Some(&credentials.password))
            .json(&body)
            .send()
            .await?;

        let key = check(response).await?.text().await?.trim().to_string();
        if key.is_empty() {
            return Err(GbifError::Api {
                status: 200,
                message: "empty download key".to_string(),
            });
        }

        info!(key = %key, "GBIF download requested");
        Ok(key)
    }

    /// Full metadata record of a download job.
    pub async fn download_metadata(&self, key: &str) -> GbifResult<Value> {
        let response = self
            .http
            .get(self.url(&format!("occurrence/download/{}", key)))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn download_status(&self, key: &str) -> GbifResult<DownloadStatus> {
        let meta = self.download_metadata(key).await?;
        let status = meta
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| GbifError::Api {
                status: 200,
                message: format!("download {} has no status", key),
            })?;
        Ok(DownloadStatus::from_api(status))
    }

    /// Save a finished job's archive as `<out_dir>/<name|key>.zip` and its
    /// metadata as `<out_dir>/<name|key>.json`. Returns the archive path.
    #[instrument(skip(self, out_dir), fields(out_dir = %out_dir.display()))]
    pub async fn download_request_to_disk(
        &self,
        key: &str,
        out_dir: &Path,
        name: Option<&str>,
    ) -> GbifResult<PathBuf> {
        let stem = name.unwrap_or(key);
        let zip_path = out_dir.join(format!("{}.zip", stem));

        let manager = DownloadManager::with_client(self.http.clone(), self.download_config.clone());
        let url = self.url(&format!("occurrence/download/request/{}.zip", key));
        manager.download(&url, &zip_path).await?;

        let meta = self.download_metadata(key).await?;
        let meta_path = out_dir.join(format!("{}.json", stem));
        tokio::fs::write(&meta_path, serde_json::to_vec(&meta)?).await?;

        info!(path = %zip_path.display(), "GBIF download saved");
        Ok(zip_path)
    }

    /// Poll a job until it succeeds, then download it.
    pub async fn wait_and_download(
        &self,
        key: &str,
        out_dir: &Path,
        name: Option<&str>,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> GbifResult<PathBuf> {
        let started = Instant::now();

        loop {
            let status = self.download_status(key).await?;

            if status == DownloadStatus::Succeeded {
                info!(key = %key, "Download job succeeded. Downloading file...");
                return self.download_request_to_disk(key, out_dir, name).await;
            }
            if status.is_failure() {
                return Err(GbifError::DownloadFailed {
                    key: key.to_string(),
                    status,
                });
            }

            let waited = started.elapsed();
            if waited > max_wait {
                return Err(GbifError::Timeout {
                    key: key.to_string(),
                    waited,
                });
            }

            info!(key = %key, status = %status, "Download job not ready. Checking again later");
            tokio::time::sleep(poll_interval).await;
        }
    }
}

async fn check(response: Response) -> GbifResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(GbifError::Api {
        status: status.as_u16(),
        message,
    })
}
