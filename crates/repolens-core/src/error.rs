use std::collections::BTreeMap;

/// Field-level error details returned by the service, e.g.
/// `{"repository_url": ["Enter a valid URL."]}`.
pub type FieldDetails = BTreeMap<String, Vec<String>>;

// ── Validation ──

/// Bad input, resolved locally. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ── Transport ──

/// Error from a single call to the analysis service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response.
    #[error("{message} (HTTP {status})")]
    Rejected {
        status: u16,
        message: String,
        details: FieldDetails,
    },
    /// No response received.
    #[error("network error: {0}")]
    Network(String),
    /// A response arrived but its body could not be understood.
    #[error("unexpected response (HTTP {status}): {reason}")]
    Decode { status: u16, reason: String },
}

// ── Submission ──

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("invalid {0}")]
    Validation(#[from] ValidationError),
    #[error("analysis request rejected: {}", format_details(.message, .details))]
    Service {
        status: u16,
        message: String,
        details: FieldDetails,
    },
    #[error("could not reach the analysis service: {0}")]
    Network(String),
}

impl From<ClientError> for SubmissionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected {
                status,
                message,
                details,
            } => SubmissionError::Service {
                status,
                message,
                details,
            },
            ClientError::Network(msg) => SubmissionError::Network(msg),
            ClientError::Decode { status, reason } => SubmissionError::Service {
                status,
                message: format!("unexpected response: {reason}"),
                details: FieldDetails::new(),
            },
        }
    }
}

/// Render a service message with its field details appended:
/// `"Invalid input. repository_url: bad, worse; github_token: short"`.
pub fn format_details(message: &str, details: &FieldDetails) -> String {
    if details.is_empty() {
        return message.to_string();
    }
    let fields = details
        .iter()
        .map(|(field, msgs)| format!("{field}: {}", msgs.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{message}. {fields}")
}

// ── Tracking ──

/// Terminal, non-success end of a tracking session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
    #[error("analysis {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },
    #[error("gave up watching analysis {job_id} after {attempts} status checks")]
    PollingTimedOut { job_id: String, attempts: u32 },
    #[error("stopped watching analysis {job_id}")]
    Cancelled { job_id: String },
}

impl TrackingError {
    /// What the user should do next. Differs per category: a timeout is not
    /// a failure and must not be presented as one.
    pub fn recovery_hint(&self) -> String {
        match self {
            TrackingError::JobFailed { .. } => {
                "Fix the repository URL or token and resubmit with `repolens analyze`.".to_string()
            }
            TrackingError::PollingTimedOut { job_id, .. } => format!(
                "The analysis may still be running. Check back later with `repolens status {job_id}`."
            ),
            TrackingError::Cancelled { job_id } => format!(
                "The analysis continues server-side. Resume with `repolens watch {job_id}`."
            ),
        }
    }
}

// ── Report ──

/// The report for a completed job could not be fetched. Terminal for the
/// report view; nothing is rendered from a failed fetch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("failed to load report for analysis {job_id}: {source}")]
pub struct ReportFetchError {
    pub job_id: String,
    #[source]
    pub source: ClientError,
}

impl ReportFetchError {
    pub fn recovery_hint(&self) -> String {
        format!(
            "Retry with `repolens report {}` or analyze another repository with `repolens analyze <url>`.",
            self.job_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_details_joins_fields() {
        let mut details = FieldDetails::new();
        details.insert("repository_url".into(), vec!["bad".into(), "worse".into()]);
        details.insert("github_token".into(), vec!["short".into()]);
        assert_eq!(
            format_details("Invalid input", &details),
            "Invalid input. github_token: short; repository_url: bad, worse"
        );
        assert_eq!(format_details("Boom", &FieldDetails::new()), "Boom");
    }

    #[test]
    fn client_error_maps_to_submission_categories() {
        let net: SubmissionError = ClientError::Network("refused".into()).into();
        assert!(matches!(net, SubmissionError::Network(_)));

        let rejected: SubmissionError = ClientError::Rejected {
            status: 400,
            message: "Invalid".into(),
            details: FieldDetails::new(),
        }
        .into();
        assert!(matches!(rejected, SubmissionError::Service { status: 400, .. }));

        let decode: SubmissionError = ClientError::Decode {
            status: 200,
            reason: "missing id".into(),
        }
        .into();
        assert!(matches!(decode, SubmissionError::Service { status: 200, .. }));
    }

    #[test]
    fn timeout_and_failure_hints_differ() {
        let failed = TrackingError::JobFailed {
            job_id: "7".into(),
            message: "rate limited".into(),
        };
        let timed_out = TrackingError::PollingTimedOut {
            job_id: "7".into(),
            attempts: 60,
        };
        assert_ne!(failed.recovery_hint(), timed_out.recovery_hint());
        assert_ne!(failed.to_string(), timed_out.to_string());
        assert!(timed_out.recovery_hint().contains("repolens status 7"));
        assert!(failed.to_string().contains("rate limited"));
    }
}
