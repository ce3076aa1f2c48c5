use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ── Status ──

/// Lifecycle status of an analysis job as reported by the service.
///
/// Ordered `Pending < InProgress < {Completed, Failed}`; the two terminal
/// states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// Parse a service status string. Case-insensitive; accepts the
    /// `processing`/`running` spellings some service versions emit.
    pub fn parse(raw: &str) -> Option<Self> {
        let norm = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "pending" | "queued" => Some(JobStatus::Pending),
            "in_progress" | "inprogress" | "processing" | "running" => Some(JobStatus::InProgress),
            "completed" | "complete" | "done" => Some(JobStatus::Completed),
            "failed" | "error" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "InProgress",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::InProgress => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the status monotonic.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    /// Unknown status strings decode as `InProgress`: the job exists and is
    /// not terminal as far as the client can tell, so watching continues.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::parse(&raw).unwrap_or_else(|| {
            tracing::debug!(status = %raw, "unknown job status, treating as in progress");
            JobStatus::InProgress
        }))
    }
}

// ── Job ──

/// One submitted repository-analysis request tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: String,
    pub repository_url: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Message shown when the service reports failure without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Analysis failed";

impl AnalysisJob {
    pub fn pending(id: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repository_url: repository_url.into(),
            status: JobStatus::Pending,
            error_message: None,
        }
    }

    /// Apply a status observed in a poll response.
    /// Returns `true` if the job changed. Regressions and updates after a
    /// terminal state are ignored.
    pub fn observe(&mut self, status: JobStatus, error_message: Option<String>) -> bool {
        if status == self.status {
            return false;
        }
        if !self.status.can_advance_to(status) {
            tracing::debug!(
                job_id = %self.id,
                from = self.status.as_str(),
                to = status.as_str(),
                "ignoring non-monotonic status update"
            );
            return false;
        }
        self.status = status;
        self.error_message = if status == JobStatus::Failed {
            Some(
                error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            )
        } else {
            None
        };
        true
    }
}

// ── Recent-jobs record ──

/// Snapshot of a job written once at submission time for the recent list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentJobRecord {
    pub id: String,
    pub repository_url: String,
    pub status: JobStatus,
    pub created_at: String,
}

impl RecentJobRecord {
    pub fn from_job(job: &AnalysisJob, created_at: impl Into<String>) -> Self {
        Self {
            id: job.id.clone(),
            repository_url: job.repository_url.clone(),
            status: job.status,
            created_at: created_at.into(),
        }
    }
}
