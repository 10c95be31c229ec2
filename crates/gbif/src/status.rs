use std::fmt;

/// Status of an occurrence download job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Preparing,
    Running,
    Succeeded,
    Failed,
    Killed,
    Cancelled,
    Suspended,
    FileErased,
    Other(String),
}

impl DownloadStatus {
    pub fn from_api(status: &str) -> Self {
        match status {
            "PREPARING" => DownloadStatus::Preparing,
            "RUNNING" => DownloadStatus::Running,
            "SUCCEEDED" => DownloadStatus::Succeeded,
            "FAILED" => DownloadStatus::Failed,
            "KILLED" => DownloadStatus::Killed,
            "CANCELLED" => DownloadStatus::Cancelled,
            "SUSPENDED" => DownloadStatus::Suspended,
            "FILE_ERASED" => DownloadStatus::FileErased,
            other => DownloadStatus::Other(other.to_string()),
        }
    }

    /// The job will never produce a file.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DownloadStatus::Failed | DownloadStatus::Killed | DownloadStatus::Cancelled
        )
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadStatus::Preparing => "PREPARING",
            DownloadStatus::Running => "RUNNING",
            DownloadStatus::Succeeded => "SUCCEEDED",
            DownloadStatus::Failed => "FAILED",
            DownloadStatus::Killed => "KILLED",
            DownloadStatus::Cancelled => "CANCELLED",
            DownloadStatus::Suspended => "SUSPENDED",
            DownloadStatus::FileErased => "FILE_ERASED",
            DownloadStatus::Other(s) => s,
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api() {
        assert_eq!(DownloadStatus::from_api("SUCCEEDED"), DownloadStatus::Succeeded);
        assert_eq!(DownloadStatus::from_api("FILE_ERASED"), DownloadStatus::FileErased);
        assert_eq!(
            DownloadStatus::from_api("QUEUED"),
            DownloadStatus::Other("QUEUED".to_string())
        );
    }

    #[test]
    fn test_failure_states() {
        assert!(DownloadStatus::Killed.is_failure());
        assert!(DownloadStatus::Cancelled.is_failure());
        assert!(!DownloadStatus::Suspended.is_failure());
        assert!(!DownloadStatus::Running.is_failure());
    }

    #[test]
    fn test_display_matches_api() {
        for s in ["PREPARING", "RUNNING", "FILE_ERASED", "QUEUED"] {
            assert_eq!(DownloadStatus::from_api(s).to_string(), s);
        }
    }
}
