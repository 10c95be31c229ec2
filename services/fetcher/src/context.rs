//! Shared state for a single command run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use earth_engine::{ee_init, EarthEngineClient, DEFAULT_POLL_INTERVAL};
use registry_common::config::resolve_path_in;
use registry_common::{project_root, Params};
use storage::GcsStore;
use tracing::warn;

pub struct Context {
    params: Params,
    root: PathBuf,
    poll_interval: Duration,
}

impl Context {
    pub fn new(params: Params, root: PathBuf) -> Self {
        Self {
            params,
            root,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Load the parameter file. A missing file is not an error here since
    /// some commands need no parameters; those that do fail on the absent
    /// section instead.
    pub fn load(path: &Path) -> Result<Self> {
        let params = if path.exists() {
            Params::load(path).with_context(|| format!("Failed to load {}", path.display()))?
        } else {
            warn!(path = %path.display(), "Parameter file not found; using empty parameters");
            Params::default()
        };
        Ok(Self::new(params, project_root()))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve_path_in(&self.root, path)
    }

    /// Connect to Earth Engine with the `ee` section's project.
    pub async fn ee_client(&self) -> Result<EarthEngineClient> {
        let ee = self.params.ee()?;
        let mut client = ee_init(&ee.project_id, ee.high_volume)
            .await
            .context("Earth Engine initialization failed")?;
        if let Some(gcs) = &self.params.gcs {
            client = client.with_bucket_location(&gcs.location);
        }
        Ok(client)
    }

    pub fn blob_store(&self, bucket: &str) -> Result<GcsStore> {
        GcsStore::from_env(bucket).with_context(|| format!("Cannot open bucket {}", bucket))
    }
}
