use crate::wire::{HealthStatus, JobSnapshot, SubmitRequest};
use repolens_core::ClientError;

/// The remote analysis service, reached only through its request/response
/// contract. Implemented by `HttpService` (real) and `MockService` (tests).
#[async_trait::async_trait]
pub trait AnalysisService: Send + Sync {
    /// `POST /analyze/`
    async fn submit(&self, request: &SubmitRequest) -> Result<JobSnapshot, ClientError>;

    /// `GET /analyze/{id}/`
    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ClientError>;

    /// `GET /analyze/{id}/report/`, undecoded.
    async fn report(&self, job_id: &str) -> Result<serde_json::Value, ClientError>;

    /// `GET /health/`
    async fn health(&self) -> Result<HealthStatus, ClientError>;
}
