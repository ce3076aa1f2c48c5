//! HTTP implementation of [`AnalysisService`].
//!
//! Requests go through a blocking `ureq` agent on tokio's blocking pool so a
//! slow response never stalls the timers running on the async side.

use crate::service::AnalysisService;
use crate::wire::{decode_response, HealthStatus, JobSnapshot, SubmitRequest};
use repolens_core::ClientError;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpService {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpService {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: String) -> Result<(u16, String), ClientError> {
        let agent = self.agent.clone();
        let url = self.url(&path);
        run_blocking(move || {
            tracing::debug!(%url, "GET");
            let resp = agent
                .get(url.as_str())
                .header("Accept", "application/json")
                .call()
                .map_err(network)?;
            read_body(resp)
        })
        .await
    }

    async fn post_json(&self, path: &str, body: String) -> Result<(u16, String), ClientError> {
        let agent = self.agent.clone();
        let url = self.url(path);
        run_blocking(move || {
            tracing::debug!(%url, "POST");
            let resp = agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .send(body)
                .map_err(network)?;
            read_body(resp)
        })
        .await
    }
}

#[async_trait::async_trait]
impl AnalysisService for HttpService {
    async fn submit(&self, request: &SubmitRequest) -> Result<JobSnapshot, ClientError> {
        let body = serde_json::to_string(request).map_err(|e| ClientError::Decode {
            status: 0,
            reason: format!("encoding request: {e}"),
        })?;
        let (status, text) = self.post_json("/analyze/", body).await?;
        decode_response(status, &text)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ClientError> {
        let (status, text) = self
            .get(format!("/analyze/{}/", path_segment(job_id)))
            .await?;
        decode_response(status, &text)
    }

    async fn report(&self, job_id: &str) -> Result<serde_json::Value, ClientError> {
        let (status, text) = self
            .get(format!("/analyze/{}/report/", path_segment(job_id)))
            .await?;
        decode_response(status, &text)
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let (status, text) = self.get("/health/".to_string()).await?;
        decode_response(status, &text)
    }
}

async fn run_blocking<F>(f: F) -> Result<(u16, String), ClientError>
where
    F: FnOnce() -> Result<(u16, String), ClientError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ClientError::Network(format!("request task failed: {e}")))?
}

fn read_body(mut resp: ureq::http::Response<ureq::Body>) -> Result<(u16, String), ClientError> {
    let status = resp.status().as_u16();
    let text = resp.body_mut().read_to_string().map_err(network)?;
    Ok((status, text))
}

fn network(e: ureq::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

/// Percent-encode an opaque id for use as one path segment.
fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = HttpService::new("http://localhost:8000/api/", DEFAULT_TIMEOUT);
        assert_eq!(svc.base_url(), "http://localhost:8000/api");
        assert_eq!(svc.url("/analyze/"), "http://localhost:8000/api/analyze/");
    }

    #[test]
    fn path_segment_escapes_reserved_bytes() {
        assert_eq!(path_segment("42"), "42");
        assert_eq!(
            path_segment("3f2a-uuid_x.y~z"),
            "3f2a-uuid_x.y~z"
        );
        assert_eq!(path_segment("a/b c"), "a%2Fb%20c");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let svc = HttpService::new("http://127.0.0.1:9/api", Duration::from_secs(2));
        let err = svc.job_status("1").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)), "{err:?}");
    }
}
