use crate::context::{runtime, Context};
use anyhow::Result;
use repolens_client::AnalysisService;
use repolens_core::{RecentJobRecord, RepoRef};
use repolens_store::RecentJobs;

/// Execute `repolens recent [--refresh] [--clear]`
pub fn execute(api: Option<&str>, refresh: bool, clear: bool) -> Result<()> {
    let mut recent = RecentJobs::open_default();
    if clear {
        recent.clear()?;
        println!("Recent jobs cleared.");
        return Ok(());
    }

    let records = recent.list().to_vec();
    if records.is_empty() {
        println!("No recent jobs.");
        return Ok(());
    }

    let live = if refresh {
        let service = Context::load(api).service();
        let rt = runtime()?;
        rt.block_on(live_statuses(service.as_ref(), &records))
    } else {
        vec![None; records.len()]
    };

    for (record, live) in records.iter().zip(live) {
        println!("{}", format_record(record, live.as_deref()));
    }
    Ok(())
}

/// Current status per record, fetched at render time. The cache is not
/// updated.
async fn live_statuses(
    service: &dyn AnalysisService,
    records: &[RecentJobRecord],
) -> Vec<Option<String>> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let status = match service.job_status(&record.id).await {
            Ok(snapshot) => snapshot.status.to_string(),
            Err(e) => {
                tracing::debug!(job_id = %record.id, error = %e, "live status unavailable");
                "unavailable".to_string()
            }
        };
        out.push(Some(status));
    }
    out
}

fn format_record(record: &RecentJobRecord, live: Option<&str>) -> String {
    let status = match live {
        Some(now) => format!("{} -> {now}", record.status),
        None => record.status.to_string(),
    };
    format!(
        "{:<10} {:<32} {:<24} {}",
        record.id,
        RepoRef::label_for(&record.repository_url),
        status,
        record.created_at
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_client::mock::snapshot;
    use repolens_client::MockService;
    use repolens_core::{ClientError, JobStatus};

    fn record(id: &str) -> RecentJobRecord {
        RecentJobRecord {
            id: id.to_string(),
            repository_url: "https://github.com/octocat/Hello-World".to_string(),
            status: JobStatus::Pending,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn refresh_fetches_each_record_and_tolerates_errors() {
        let svc = MockService::new();
        svc.push_status(Ok(snapshot("a", JobStatus::Completed)))
            .push_status(Err(ClientError::Network("down".into())));
        let live = live_statuses(&svc, &[record("a"), record("b")]).await;
        assert_eq!(
            live,
            vec![Some("completed".to_string()), Some("unavailable".to_string())]
        );
        assert_eq!(svc.status_calls(), 2);
    }

    #[test]
    fn record_line_shows_cached_and_live_status() {
        let line = format_record(&record("a"), Some("completed"));
        assert!(line.contains("octocat/Hello-World"));
        assert!(line.contains("pending -> completed"));
        let line = format_record(&record("a"), None);
        assert!(!line.contains("->"));
    }
}
