pub mod error;
pub mod job;
pub mod repo_url;

pub use error::*;
pub use job::*;
pub use repo_url::{validate_repository_url, RepoRef};

/// Current UTC time as RFC 3339, the timestamp format used in persisted records.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
