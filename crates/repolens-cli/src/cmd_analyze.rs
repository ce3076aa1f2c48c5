use crate::cmd_watch::{finish, track};
use crate::context::{runtime, Context};
use crate::PollArgs;
use anyhow::{bail, Result};
use repolens_client::submit;
use repolens_core::SubmissionError;
use repolens_store::RecentJobs;

pub struct AnalyzeParams<'a> {
    pub api: Option<&'a str>,
    pub url: &'a str,
    pub token: Option<&'a str>,
    pub no_wait: bool,
    pub json: bool,
    pub poll: &'a PollArgs,
}

/// Execute `repolens analyze <url>`
pub fn execute(params: AnalyzeParams<'_>) -> Result<()> {
    let ctx = Context::load(params.api).with_poll(params.poll);
    let service = ctx.service();
    let mut recent = RecentJobs::open_default();
    let rt = runtime()?;

    rt.block_on(async {
        let job = match submit(service.as_ref(), Some(&mut recent), params.url, params.token).await {
            Ok(job) => job,
            Err(err) => bail!("{}", describe_submission(&err)),
        };
        println!("Submitted analysis {} for {}", job.id, job.repository_url);
        if params.no_wait {
            println!("Follow it with `repolens watch {}`.", job.id);
            return Ok(());
        }

        let outcome = track(service.clone(), job, ctx.tracking()).await;
        finish(service.as_ref(), outcome, params.json).await
    })
}

fn describe_submission(err: &SubmissionError) -> String {
    match err {
        SubmissionError::Validation(_) | SubmissionError::Service { .. } => err.to_string(),
        SubmissionError::Network(_) => format!(
            "{err}\nCheck that the analysis service is reachable (`repolens config check`)."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_core::{FieldDetails, ValidationError};

    #[test]
    fn submission_errors_are_distinguished() {
        let v = describe_submission(&SubmissionError::Validation(ValidationError::new(
            "repository_url",
            "must be a GitHub repository URL",
        )));
        assert!(v.contains("must be a GitHub repository URL"));

        let mut details = FieldDetails::new();
        details.insert("repository_url".into(), vec!["Repository not found".into()]);
        let s = describe_submission(&SubmissionError::Service {
            status: 400,
            message: "Invalid input".into(),
            details,
        });
        assert!(s.starts_with("analysis request rejected: Invalid input"));
        assert!(s.contains("Repository not found"));

        let n = describe_submission(&SubmissionError::Network("refused".into()));
        assert!(n.contains("repolens config check"));
    }
}
