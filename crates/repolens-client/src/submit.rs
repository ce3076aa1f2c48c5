use crate::service::AnalysisService;
use crate::wire::SubmitRequest;
use repolens_core::{validate_repository_url, AnalysisJob, SubmissionError, ValidationError};
use repolens_store::RecentJobs;

pub const FIELD_GITHUB_TOKEN: &str = "github_token";

/// Blank tokens mean "no token"; a token with inner whitespace is rejected.
pub fn normalize_token(token: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if token.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            FIELD_GITHUB_TOKEN,
            "access token must not contain whitespace",
        ));
    }
    Ok(Some(token.to_string()))
}

/// Validate and submit a repository for analysis.
///
/// Invalid input is rejected before any request is issued. On success the
/// returned job is `Pending` (status is only ever advanced by polling) and a
/// record is prepended to `recent` when given. A failure to persist that
/// record is logged and does not fail the submission: the job already exists
/// server-side.
pub async fn submit(
    service: &dyn AnalysisService,
    recent: Option<&mut RecentJobs>,
    repository_url: &str,
    token: Option<&str>,
) -> Result<AnalysisJob, SubmissionError> {
    let repository_url = repository_url.trim();
    let repo = validate_repository_url(repository_url)?;
    let github_token = normalize_token(token)?;

    let request = SubmitRequest {
        repository_url: repository_url.to_string(),
        github_token,
    };
    let snapshot = service.submit(&request).await?;
    tracing::info!(job_id = %snapshot.id, repo = %repo.slug(), "analysis submitted");
    if snapshot.status != repolens_core::JobStatus::Pending {
        tracing::debug!(
            job_id = %snapshot.id,
            status = snapshot.status.as_str(),
            "submit response status ignored until first poll"
        );
    }

    let job = AnalysisJob::pending(snapshot.id, repository_url);
    if let Some(recent) = recent {
        if let Err(e) = recent.record(&job) {
            tracing::warn!(job_id = %job.id, error = %e, "failed to record recent job");
        }
    }
    Ok(job)
}
