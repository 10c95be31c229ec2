//! Wait for export tasks and download their results.

use std::path::{Path, PathBuf};
use std::time::Duration;

use storage::{download_blob_if_exists, BlobFetch, BlobStore};
use tracing::{debug, error, info, warn};

use crate::client::EarthEngineClient;
use crate::error::EeResult;
use crate::task::{Task, TaskState};

/// How long to wait between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// A task that ended without output.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedTask {
    pub id: String,
    pub description: String,
    pub state: TaskState,
    pub message: String,
}

/// What `download_when_complete` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorReport {
    /// Local files written or already present.
    pub downloaded: Vec<PathBuf>,
    /// Completed tasks whose output was not in the bucket.
    pub missing: Vec<String>,
    pub failed: Vec<FailedTask>,
}

impl MonitorReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.missing.is_empty()
    }
}

/// Poll `tasks` until each one has finished, downloading the output of
/// completed tasks from `store` into `out_dir` as they finish.
///
/// Without `tasks`, every export operation of the project is monitored.
/// Unsubmitted (dry-run) tasks are skipped.
pub async fn download_when_complete(
    client: &EarthEngineClient,
    store: &dyn BlobStore,
    out_dir: &Path,
    tasks: Option<Vec<Task>>,
    poll_interval: Duration,
) -> EeResult<MonitorReport> {
    let tasks = match tasks {
        Some(tasks) => tasks,
        None => {
            info!("No tasks provided. Getting task list...");
            client
                .list_operations()
                .await?
                .iter()
                .map(Task::from_operation)
                .collect()
        }
    };

    let mut pending: Vec<Task> = tasks
        .into_iter()
        .filter(|task| {
            if task.state == TaskState::Unsubmitted {
                warn!(description = %task.description, "Skipping unsubmitted task");
                false
            } else {
                true
            }
        })
        .collect();

    tokio::fs::create_dir_all(out_dir).await?;
    let mut report = MonitorReport::default();

    info!(
        tasks = pending.len(),
        bucket = %store.bucket(),
        out_dir = %out_dir.display(),
        "Checking for completed tasks..."
    );

    while !pending.is_empty() {
        let mut still_running = Vec::with_capacity(pending.len());

        for mut task in std::mem::take(&mut pending) {
            match task.refresh(client).await? {
                TaskState::Completed => {
                    match download_blob_if_exists(store, &task.description, out_dir, true).await? {
                        BlobFetch::Downloaded(path) | BlobFetch::Skipped(path) => {
                            report.downloaded.push(path)
                        }
                        BlobFetch::Multipart(paths) => report.downloaded.extend(paths),
                        BlobFetch::NotFound => report.missing.push(task.description.clone()),
                    }
                }
                state @ (TaskState::Failed | TaskState::Cancelled) => {
                    let message = task
                        .error_message
                        .clone()
                        .unwrap_or_else(|| state.to_string());
                    error!(
                        task = %task.short_id(),
                        description = %task.description,
                        error = %message,
                        "Task {}", state
                    );
                    report.failed.push(FailedTask {
                        id: task.id.clone().unwrap_or_default(),
                        description: task.description.clone(),
                        state,
                        message,
                    });
                }
                _ => still_running.push(task),
            }
        }

        pending = still_running;
        if !pending.is_empty() {
            debug!(remaining = pending.len(), "Waiting for tasks");
            tokio::time::sleep(poll_interval).await;
        }
    }

    info!(
        downloaded = report.downloaded.len(),
        failed = report.failed.len(),
        missing = report.missing.len(),
        "All tasks and downloads completed."
    );
    Ok(report)
}
