use crate::context::{runtime, Context};
use anyhow::{Context as _, Result};
use repolens_client::JobSnapshot;
use repolens_core::JobStatus;

/// Execute `repolens status <id>`
pub fn execute(api: Option<&str>, id: &str, json: bool) -> Result<()> {
    let ctx = Context::load(api);
    let service = ctx.service();
    let rt = runtime()?;
    let snapshot = rt
        .block_on(service.job_status(id))
        .with_context(|| format!("fetching analysis {id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot.to_job(""))?);
    } else {
        print!("{}", format_status(&snapshot));
    }
    Ok(())
}

fn format_status(snapshot: &JobSnapshot) -> String {
    let mut out = format!("Analysis {}\n", snapshot.id);
    if let Some(url) = &snapshot.repository_url {
        out.push_str(&format!("  Repository: {url}\n"));
    }
    let status = snapshot
        .status_display
        .clone()
        .unwrap_or_else(|| snapshot.status.to_string());
    out.push_str(&format!("  Status:     {status}\n"));
    if let Some(score) = snapshot.overall_score {
        out.push_str(&format!("  Score:      {score:.1}\n"));
    }
    for (label, at) in [
        ("Created", &snapshot.created_at),
        ("Started", &snapshot.started_at),
        ("Completed", &snapshot.completed_at),
    ] {
        if let Some(at) = at {
            out.push_str(&format!("  {label:<11} {at}\n"));
        }
    }
    match snapshot.status {
        JobStatus::Failed => {
            let job = snapshot.to_job("");
            out.push_str(&format!(
                "  Error:      {}\n",
                job.error_message.unwrap_or_default()
            ));
        }
        JobStatus::Completed => {
            out.push_str(&format!("View the report with `repolens report {}`.\n", snapshot.id));
        }
        _ => {
            out.push_str(&format!("Follow it with `repolens watch {}`.\n", snapshot.id));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_client::mock::{failed_snapshot, snapshot};

    #[test]
    fn failed_status_shows_message() {
        let text = format_status(&failed_snapshot("3", "rate limited"));
        assert!(text.contains("Error:      rate limited"));
    }

    #[test]
    fn running_status_points_at_watch() {
        let text = format_status(&snapshot("3", JobStatus::InProgress));
        assert!(text.contains("Status:     in progress"));
        assert!(text.contains("repolens watch 3"));
    }
}
