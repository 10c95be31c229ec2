//! GBIF occurrence download: request (or resume) a job, wait, unpack.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use gbif::{unzip_and_rename, GbifClient};
use registry_common::GbifParams;
use serde_json::Value;
use tracing::info;

use crate::context::Context;

/// Command-line overrides for the `gbif` section.
#[derive(Debug, Default, Clone)]
pub struct GbifArgs {
    pub query: Option<PathBuf>,
    pub name: Option<String>,
    pub key: Option<String>,
    pub output: Option<PathBuf>,
}

/// Settled inputs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GbifJob {
    pub query: PathBuf,
    pub name: Option<String>,
    pub key: Option<String>,
    pub out_dir: PathBuf,
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

/// Merge arguments over parameters and check them.
///
/// The query must be a `.json` file. An `--output` directory must already
/// exist; the configured default is created.
pub fn resolve_job(ctx: &Context, cfg: &GbifParams, args: GbifArgs) -> Result<GbifJob> {
    let query = ctx.resolve(args.query.unwrap_or_else(|| cfg.query.clone()));
    if query.extension().and_then(|e| e.to_str()) != Some("json") {
        bail!("Query file must be a JSON file: {}", query.display());
    }

    let out_dir = match args.output {
        Some(output) => {
            let output = ctx.resolve(output);
            if !output.is_dir() {
                bail!("Output directory does not exist: {}", output.display());
            }
            output
        }
        None => {
            let out_dir = ctx.resolve(&cfg.out_dir);
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Cannot create {}", out_dir.display()))?;
            out_dir
        }
    };

    Ok(GbifJob {
        query,
        name: args.name.or_else(|| cfg.name.clone()),
        key: args.key,
        out_dir,
        max_wait: Duration::from_secs_f64(cfg.max_wait_hours.max(0.0) * 3600.0),
        poll_interval: Duration::from_secs(cfg.poll_interval_secs),
    })
}

fn read_query(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read query {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Run `job` against `client`. Returns the unpacked `.parquet` directory.
pub async fn fetch(client: &GbifClient, job: &GbifJob) -> Result<PathBuf> {
    let key = match &job.key {
        Some(key) => {
            info!(key = %key, "Using existing download job");
            key.clone()
        }
        None => {
            let query = read_query(&job.query)?;
            let key = client.init_download(&query).await?;
            info!(key = %key, "Download job created");
            key
        }
    };

    let zip = client
        .wait_and_download(&key, &job.out_dir, job.name.as_deref(), job.max_wait, job.poll_interval)
        .await?;

    info!(zip = %zip.display(), "Unzipping and renaming...");
    let parquet = unzip_and_rename(&zip)?;
    info!(path = %parquet.display(), "Done.");
    Ok(parquet)
}

pub async fn run(ctx: &Context, args: GbifArgs) -> Result<()> {
    let defaults = GbifParams::default();
    let cfg = ctx.params().gbif.as_ref().unwrap_or(&defaults);
    let job = resolve_job(ctx, cfg, args)?;
    let client = GbifClient::from_env()?;
    fetch(&client, &job).await?;
    Ok(())
}
