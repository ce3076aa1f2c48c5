use crate::service::AnalysisService;
use crate::wire::{HealthStatus, JobSnapshot, SubmitRequest};
use repolens_core::{ClientError, JobStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Scripted service for tests. Each call pops the next queued result for its
/// endpoint. When a queue is exhausted the defaults apply: submit yields job
/// `mock-1` pending, status yields in-progress, report yields `{"id": <job>}`.
#[derive(Default)]
pub struct MockService {
    submits: Mutex<VecDeque<Result<JobSnapshot, ClientError>>>,
    statuses: Mutex<VecDeque<Result<JobSnapshot, ClientError>>>,
    reports: Mutex<VecDeque<Result<serde_json::Value, ClientError>>>,
    submit_calls: AtomicU32,
    status_calls: AtomicU32,
    report_calls: AtomicU32,
    last_submit: Mutex<Option<SubmitRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_submit(&self, result: Result<JobSnapshot, ClientError>) -> &Self {
        self.submits.lock().unwrap().push_back(result);
        self
    }

    pub fn push_status(&self, result: Result<JobSnapshot, ClientError>) -> &Self {
        self.statuses.lock().unwrap().push_back(result);
        self
    }

    pub fn push_report(&self, result: Result<serde_json::Value, ClientError>) -> &Self {
        self.reports.lock().unwrap().push_back(result);
        self
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> u32 {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn last_submit(&self) -> Option<SubmitRequest> {
        self.last_submit.lock().unwrap().clone()
    }
}

/// A snapshot with only id and status set.
pub fn snapshot(id: &str, status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        id: id.to_string(),
        repository_url: None,
        status,
        status_display: None,
        error_message: None,
        overall_score: None,
        created_at: None,
        started_at: None,
        completed_at: None,
    }
}

/// A failed snapshot carrying `message`.
pub fn failed_snapshot(id: &str, message: &str) -> JobSnapshot {
    JobSnapshot {
        error_message: Some(message.to_string()),
        ..snapshot(id, JobStatus::Failed)
    }
}

#[async_trait::async_trait]
impl AnalysisService for MockService {
    async fn submit(&self, request: &SubmitRequest) -> Result<JobSnapshot, ClientError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_submit.lock().unwrap() = Some(request.clone());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(snapshot("mock-1", JobStatus::Pending)))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(snapshot(job_id, JobStatus::InProgress)))
    }

    async fn report(&self, job_id: &str) -> Result<serde_json::Value, ClientError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.reports
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({ "id": job_id })))
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            version: Some("mock".to_string()),
            message: None,
        })
    }
}
