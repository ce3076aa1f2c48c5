//! GitHub repository URL validation.
//!
//! Accepted shape: `https://github.com/<owner>/<repo>` with an optional `www.`
//! host prefix, `.git` suffix, or trailing slash. Anything else is rejected
//! before a request is built.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)/?$")
        .expect("static regex")
});

pub const FIELD_REPOSITORY_URL: &str = "repository_url";

/// Owner and name of a validated GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// `owner/name`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Short display label for an arbitrary repository URL: the last two path
    /// segments, or the input unchanged when it has no `/`.
    pub fn label_for(url: &str) -> String {
        let trimmed = url.trim().trim_end_matches('/');
        let parts: Vec<&str> = trimmed.rsplitn(3, '/').collect();
        if parts.len() >= 2 {
            format!("{}/{}", parts[1], parts[0].trim_end_matches(".git"))
        } else {
            trimmed.to_string()
        }
    }
}

/// Validate a repository URL. Returns the parsed owner/name on success.
pub fn validate_repository_url(input: &str) -> Result<RepoRef, ValidationError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(ValidationError::new(
            FIELD_REPOSITORY_URL,
            "a repository URL is required",
        ));
    }
    let caps = GITHUB_REPO_URL.captures(url).ok_or_else(|| {
        ValidationError::new(
            FIELD_REPOSITORY_URL,
            format!("'{url}' is not a GitHub repository URL (expected https://github.com/<owner>/<repo>)"),
        )
    })?;

    let owner = caps[1].to_string();
    let name = caps[2].strip_suffix(".git").unwrap_or(&caps[2]).to_string();
    for (part, label) in [(&owner, "owner"), (&name, "repository name")] {
        if part.is_empty() || part.chars().all(|c| c == '.') {
            return Err(ValidationError::new(
                FIELD_REPOSITORY_URL,
                format!("invalid GitHub {label}: '{part}'"),
            ));
        }
    }
    Ok(RepoRef { owner, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_repo_url() {
        let r = validate_repository_url("https://github.com/octocat/Hello-World").unwrap();
        assert_eq!(r.owner, "octocat");
        assert_eq!(r.name, "Hello-World");
        assert_eq!(r.slug(), "octocat/Hello-World");
    }

    #[test]
    fn accepts_common_variants() {
        for url in [
            "https://github.com/rust-lang/rust/",
            "https://www.github.com/rust-lang/rust",
            "https://github.com/rust-lang/rust.git",
            "  https://github.com/rust-lang/rust  ",
            "https://github.com/some_org/repo.name",
        ] {
            assert!(validate_repository_url(url).is_ok(), "{url}");
        }
        let r = validate_repository_url("https://github.com/rust-lang/rust.git").unwrap();
        assert_eq!(r.name, "rust");
    }

    #[test]
    fn rejects_other_shapes() {
        for url in [
            "",
            "   ",
            "octocat/Hello-World",
            "github.com/octocat/Hello-World",
            "http://github.com/octocat/Hello-World",
            "https://gitlab.com/octocat/Hello-World",
            "https://github.com/octocat",
            "https://github.com/octocat/Hello-World/tree/main",
            "https://github.com/octo cat/Hello-World",
            "https://github.com/../x",
            "https://github.com/octocat/.git",
        ] {
            let err = validate_repository_url(url).unwrap_err();
            assert_eq!(err.field, FIELD_REPOSITORY_URL, "{url}");
        }
    }

    #[test]
    fn label_takes_last_two_segments() {
        assert_eq!(
            RepoRef::label_for("https://github.com/octocat/Hello-World/"),
            "octocat/Hello-World"
        );
        assert_eq!(RepoRef::label_for("unknown"), "unknown");
    }
}
