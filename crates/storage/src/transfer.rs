//! Resumable download manager with retry logic and progress tracking.
//!
//! Key features:
//! - HTTP Range requests for resumable downloads
//! - Exponential backoff retry on failures
//! - File integrity verification via Content-Length
//! - Optional progress bar for interactive runs

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{header, Client, Response, StatusCode};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{StorageError, StorageResult};

/// Configuration for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Draw a progress bar while streaming
    pub show_progress: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(120),
            request_timeout: Duration::from_secs(3600), // archives run to several GB
            connect_timeout: Duration::from_secs(30),
            show_progress: false,
        }
    }
}

/// Download progress information.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub url: String,
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
    pub started_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub retry_count: u32,
}

impl DownloadProgress {
    fn new(url: &str) -> Self {
        let now = Utc::now();
        Self {
            url: url.to_string(),
            total_bytes: None,
            downloaded_bytes: 0,
            started_at: now,
            last_update: now,
            retry_count: 0,
        }
    }

    pub fn percent_complete(&self) -> Option<f64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .map(|total| (self.downloaded_bytes as f64 / total as f64) * 100.0)
    }

    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = (self.last_update - self.started_at).num_seconds() as f64;
        if elapsed > 0.0 {
            self.downloaded_bytes as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// The last path segment of a URL, without query string or fragment.
pub fn filename_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(str::to_string)
}

/// Manages downloads with resumption and retry support.
pub struct DownloadManager {
    client: Client,
    config: DownloadConfig,
}

impl DownloadManager {
    /// Create a new download manager with the given configuration.
    pub fn new(config: DownloadConfig) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| StorageError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Reuse an already configured client (e.g. one carrying auth headers).
    pub fn with_client(client: Client, config: DownloadConfig) -> Self {
        Self { client, config }
    }

    /// Download `url` to `dest` with automatic retry and resumption.
    ///
    /// Bytes land in `<dest>.partial` first and are moved into place once
    /// complete. Returns `dest`.
    #[instrument(skip(self, dest), fields(url = %url, dest = %dest.display()))]
    pub async fn download(&self, url: &str, dest: &Path) -> StorageResult<PathBuf> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = partial_path(dest);
        let mut progress = DownloadProgress::new(url);

        info!("Starting download");

        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.download_with_resume(url, &temp_path, &mut progress).await {
                Ok(()) => {
                    // Verify and move to final location
                    let actual = fs::metadata(&temp_path).await?.len();
                    if let Some(expected) = progress.total_bytes {
                        if actual != expected {
                            return Err(StorageError::SizeMismatch { expected, actual });
                        }
                    }

                    if fs::rename(&temp_path, dest).await.is_err() {
                        // rename failed (likely cross-device), fall back to copy+delete
                        fs::copy(&temp_path, dest).await?;
                        fs::remove_file(&temp_path).await?;
                    }

                    info!(bytes = actual, "Download completed");
                    return Ok(dest.to_path_buf());
                }
                Err(e) if e.is_permanent() => {
                    error!(error = %e, "Download failed");
                    return Err(e);
                }
                Err(e) => {
                    retry_count += 1;
                    progress.retry_count = retry_count;

                    if retry_count > self.config.max_retries {
                        return Err(StorageError::RetriesExhausted {
                            attempts: retry_count,
                            message: e.to_string(),
                        });
                    }

                    warn!(
                        error = %e,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Download failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
            }
        }
    }

    /// Download several files, at most `max_concurrent` at a time. Individual
    /// failures are logged and reported, not propagated.
    pub async fn download_many(
        &self,
        jobs: Vec<(String, PathBuf)>,
        max_concurrent: usize,
    ) -> Vec<(String, StorageResult<PathBuf>)> {
        stream::iter(jobs)
            .map(|(url, dest)| async move {
                let result = self.download(&url, &dest).await;
                if let Err(e) = &result {
                    error!(url = %url, error = %e, "Failed to download");
                }
                (url, result)
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await
    }

    /// The URL `url` ends up at after redirects. Falls back to `url` itself
    /// when the server does not answer a HEAD request.
    pub async fn final_url(&self, url: &str) -> String {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => response.url().to_string(),
            Ok(response) => {
                debug!(status = %response.status(), "HEAD request refused, keeping requested URL");
                url.to_string()
            }
            Err(e) => {
                debug!(error = %e, "HEAD request failed, keeping requested URL");
                url.to_string()
            }
        }
    }

    /// Download with HTTP Range support for resumption.
    async fn download_with_resume(
        &self,
        url: &str,
        temp_path: &Path,
        progress: &mut DownloadProgress,
    ) -> StorageResult<()> {
        // Get file size and range support with one HEAD request (if we don't have it)
        let head = self.probe(url).await;
        if progress.total_bytes.is_none() {
            progress.total_bytes = head.content_length;
        }

        // Loop to handle RANGE_NOT_SATISFIABLE retry without recursion
        loop {
            let resume_from = if fs::try_exists(temp_path).await? {
                fs::metadata(temp_path).await?.len()
            } else {
                0
            };

            // If we already have all the bytes, we're done
            if let Some(total) = progress.total_bytes {
                if total > 0 && resume_from >= total {
                    progress.downloaded_bytes = total;
                    return Ok(());
                }
            }

            let mut request = self.client.get(url);

            if resume_from > 0 && head.accepts_ranges {
                info!(
                    resume_from = resume_from,
                    total = ?progress.total_bytes,
                    "Resuming download"
                );
                request = request.header(header::RANGE, format!("bytes={}-", resume_from));
                progress.downloaded_bytes = resume_from;
            } else if resume_from > 0 {
                warn!("Server does not support range requests, restarting download");
                fs::remove_file(temp_path).await.ok();
                progress.downloaded_bytes = 0;
            }

            let response = request.send().await?;

            match response.status() {
                StatusCode::OK => {
                    // Full content, start from scratch
                    if resume_from > 0 {
                        fs::remove_file(temp_path).await.ok();
                        progress.downloaded_bytes = 0;
                    }
                }
                StatusCode::PARTIAL_CONTENT => {
                    debug!("Received partial content, resuming download");
                }
                StatusCode::RANGE_NOT_SATISFIABLE => {
                    if let Some(total) = progress.total_bytes {
                        if resume_from >= total {
                            return Ok(());
                        }
                    }
                    // Otherwise, start over
                    fs::remove_file(temp_path).await.ok();
                    progress.downloaded_bytes = 0;
                    continue;
                }
                status => {
                    return Err(StorageError::Status {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
            }

            if progress.total_bytes.is_none() {
                progress.total_bytes = content_length(&response);
            }

            return self.stream_to_file(response, temp_path, progress).await;
        }
    }

    /// Stream response body to file with progress updates.
    async fn stream_to_file(
        &self,
        response: Response,
        path: &Path,
        progress: &mut DownloadProgress,
    ) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        let bar = self.progress_bar(progress);
        let mut stream = response.bytes_stream();
        let mut bytes_since_log = 0u64;
        let log_interval = 64 * 1024 * 1024;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;

            progress.downloaded_bytes += chunk.len() as u64;
            progress.last_update = Utc::now();
            bytes_since_log += chunk.len() as u64;

            if let Some(bar) = &bar {
                bar.set_position(progress.downloaded_bytes);
            }

            if bytes_since_log >= log_interval {
                bytes_since_log = 0;
                if let Some(percent) = progress.percent_complete() {
                    debug!(
                        downloaded = progress.downloaded_bytes,
                        total = ?progress.total_bytes,
                        percent = format!("{:.1}%", percent),
                        speed = format!("{:.1} KB/s", progress.bytes_per_second() / 1024.0),
                        "Download progress"
                    );
                }
            }
        }

        file.flush().await?;
        file.sync_all().await?;

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        Ok(())
    }

    fn progress_bar(&self, progress: &DownloadProgress) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }
        let total = progress.total_bytes?;
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_position(progress.downloaded_bytes);
        Some(bar)
    }

    /// HEAD the URL for its size and range support. Failures are treated as
    /// "unknown size, ranges supported".
    async fn probe(&self, url: &str) -> HeadInfo {
        let response = match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => response,
            _ => return HeadInfo::default(),
        };

        // Assume support if header is missing (many servers don't send it)
        let accepts_ranges = response
            .headers()
            .get(header::ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |v| v != "none");

        HeadInfo {
            content_length: content_length(&response),
            accepts_ranges,
        }
    }
}

struct HeadInfo {
    content_length: Option<u64>,
    accepts_ranges: bool,
}

impl Default for HeadInfo {
    fn default() -> Self {
        Self {
            content_length: None,
            accepts_ranges: true,
        }
    }
}

fn content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

pub(crate) fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}
