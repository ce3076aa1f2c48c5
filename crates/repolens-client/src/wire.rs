//! Request and response bodies exchanged with the analysis service.

use repolens_core::{AnalysisJob, ClientError, FieldDetails, JobStatus};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /analyze/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitRequest {
    pub repository_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

/// Job representation returned by `POST /analyze/` and `GET /analyze/{id}/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobSnapshot {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "repo_url")]
    pub repository_url: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl JobSnapshot {
    /// Build a job from a snapshot, using `fallback_url` when the service
    /// omits the repository.
    pub fn to_job(&self, fallback_url: &str) -> AnalysisJob {
        let mut job = AnalysisJob::pending(
            self.id.clone(),
            self.repository_url
                .clone()
                .unwrap_or_else(|| fallback_url.to_string()),
        );
        job.observe(self.status, self.error_message.clone());
        job
    }
}

/// Body of `GET /health/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Service ids are integers in some deployments and UUID strings in others.
/// Both are kept as opaque strings.
pub fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

// ── Response classification ──

const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Decode a 2xx body or turn a non-2xx one into [`ClientError::Rejected`].
pub fn decode_response<T: serde::de::DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, ClientError> {
    if !(200..300).contains(&status) {
        return Err(rejection(status, body));
    }
    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        status,
        reason: e.to_string(),
    })
}

/// Interpret an error body: `{"error": true, "message": "...", "details": {...}}`.
/// Falls back to a string `error` or `detail` field, then a generic message.
pub fn rejection(status: u16, body: &str) -> ClientError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = ["message", "error", "detail"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_string();
    let details = parsed.get("details").map(field_details).unwrap_or_default();
    ClientError::Rejected {
        status,
        message,
        details,
    }
}

fn field_details(value: &Value) -> FieldDetails {
    let Some(map) = value.as_object() else {
        return FieldDetails::new();
    };
    map.iter()
        .map(|(field, msgs)| {
            let msgs = match msgs {
                Value::Array(items) => items.iter().map(value_text).collect(),
                other => vec![value_text(other)],
            };
            (field.clone(), msgs)
        })
        .collect()
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
