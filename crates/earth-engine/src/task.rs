//! Export task state.

use std::fmt;

use tracing::debug;

use crate::client::{EarthEngineClient, Operation};
use crate::error::EeResult;
use crate::export::ExportImageRequest;

/// Lifecycle of an export task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Built but never sent (dry run).
    Unsubmitted,
    Pending,
    Running,
    Cancelling,
    Completed,
    Cancelled,
    Failed,
}

impl TaskState {
    /// Map an operation state (`PENDING`, `RUNNING`, `SUCCEEDED`, ...).
    pub fn from_api(state: &str) -> Self {
        match state {
            "RUNNING" => TaskState::Running,
            "CANCELLING" => TaskState::Cancelling,
            "SUCCEEDED" | "COMPLETED" => TaskState::Completed,
            "CANCELLED" => TaskState::Cancelled,
            "FAILED" => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }

    /// Completed, cancelled or failed.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Unsubmitted => "UNSUBMITTED",
            TaskState::Pending => "PENDING",
            TaskState::Running => "RUNNING",
            TaskState::Cancelling => "CANCELLING",
            TaskState::Completed => "COMPLETED",
            TaskState::Cancelled => "CANCELLED",
            TaskState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// An export job and its last known state.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Operation resource name; `None` until submitted.
    pub id: Option<String>,
    /// Task name, also the exported file's prefix.
    pub description: String,
    pub state: TaskState,
    pub error_message: Option<String>,
    /// The request, kept for unsubmitted tasks.
    pub request: Option<ExportImageRequest>,
}

impl Task {
    pub fn unsubmitted(description: &str, request: ExportImageRequest) -> Self {
        Self {
            id: None,
            description: description.to_string(),
            state: TaskState::Unsubmitted,
            error_message: None,
            request: Some(request),
        }
    }

    pub fn from_operation(operation: &Operation) -> Self {
        let mut task = Self {
            id: Some(operation.name.clone()),
            description: operation.metadata.description.clone(),
            state: TaskState::Pending,
            error_message: None,
            request: None,
        };
        task.apply(operation);
        task
    }

    fn apply(&mut self, operation: &Operation) {
        self.state = match operation.metadata.state.as_deref() {
            Some(state) => TaskState::from_api(state),
            None if operation.done && operation.error.is_some() => TaskState::Failed,
            None if operation.done => TaskState::Completed,
            None => TaskState::Pending,
        };
        if !operation.metadata.description.is_empty() {
            self.description = operation.metadata.description.clone();
        }
        self.error_message = operation.error.as_ref().map(|e| e.message.clone());
    }

    /// Short id for logs: the last segment of the operation name.
    pub fn short_id(&self) -> &str {
        self.id
            .as_deref()
            .map(|name| name.rsplit('/').next().unwrap_or(name))
            .unwrap_or("-")
    }

    /// Fetch the current state. Finished and unsubmitted tasks are not
    /// queried again.
    pub async fn refresh(&mut self, client: &EarthEngineClient) -> EeResult<TaskState> {
        let Some(id) = self.id.clone() else {
            return Ok(self.state);
        };
        if self.state.is_finished() {
            return Ok(self.state);
        }

        let operation = client.get_operation(&id).await?;
        self.apply(&operation);
        debug!(task = %self.short_id(), description = %self.description, state = %self.state, "Task status");
        Ok(self.state)
    }
}
