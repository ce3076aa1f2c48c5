use repolens_client::mock::{failed_snapshot, snapshot};
use repolens_client::{submit, AnalysisService, MockService};
use repolens_core::{JobStatus, TrackingError};
use repolens_report::{assemble, render_text, Dimension};
use repolens_store::{MemoryKvStore, RecentJobs};
use repolens_tracker::{PollConfig, PollEvent, TrackingConfig, TrackingSession};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn config() -> TrackingConfig {
    TrackingConfig {
        poll: PollConfig {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        },
        ..TrackingConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn submit_poll_and_report() {
    let svc = Arc::new(MockService::new());
    svc.push_submit(Ok(snapshot("abc", JobStatus::Pending)))
        .push_status(Ok(snapshot("abc", JobStatus::InProgress)))
        .push_status(Err(repolens_core::ClientError::Network("reset".into())))
        .push_status(Ok(snapshot("abc", JobStatus::Completed)))
        .push_report(Ok(json!({
            "id": "abc",
            "repository_url": "https://github.com/octocat/Hello-World",
            "overall_score": 72,
            "insights": {"quality": {"key_strengths": ["Readable"]}},
            "quality_data": {"scores": {"overall": 74}}
        })));
    let mut recent = RecentJobs::new(Box::new(MemoryKvStore::new()));

    let job = submit(
        svc.as_ref(),
        Some(&mut recent),
        "https://github.com/octocat/Hello-World",
        None,
    )
    .await
    .unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(recent.list()[0].id, "abc");

    let mut session = TrackingSession::spawn(svc.clone(), job, config());
    let mut failures = 0;
    while let Some(event) = session.next_event().await {
        if let PollEvent::TickFailed { .. } = event {
            failures += 1;
        }
    }
    let done = session.wait().await.into_result().unwrap();
    assert_eq!(failures, 1);
    assert_eq!(done.status, JobStatus::Completed);

    let service: &dyn AnalysisService = svc.as_ref();
    let bundle = assemble(service, &done.id).await.unwrap();
    assert_eq!(bundle.enriched_count(), 1);
    assert!(bundle.section(Dimension::Quality).unwrap().is_enriched());
    let text = render_text(&bundle);
    assert!(text.contains("1 of 4 AI sections ready"));
    // recent entry stays as written at submission
    assert_eq!(recent.list()[0].status, JobStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn failed_job_never_fetches_a_report() {
    let svc = Arc::new(MockService::new());
    svc.push_status(Ok(failed_snapshot("abc", "rate limited")));
    let job = submit(svc.as_ref(), None, "https://github.com/octocat/Hello-World", None)
        .await
        .unwrap();

    let session = TrackingSession::spawn(svc.clone(), job, config());
    let err = session.wait().await.into_result().unwrap_err();

    assert_eq!(
        err,
        TrackingError::JobFailed {
            job_id: "mock-1".into(),
            message: "rate limited".into()
        }
    );
    assert_eq!(svc.report_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn perpetual_progress_times_out_distinctly() {
    let svc = Arc::new(MockService::new());
    let job = submit(svc.as_ref(), None, "https://github.com/a/b", None)
        .await
        .unwrap();

    let session = TrackingSession::spawn(svc.clone(), job, config());
    let err = session.wait().await.into_result().unwrap_err();

    assert!(matches!(err, TrackingError::PollingTimedOut { attempts: 60, .. }));
    assert_ne!(
        err.recovery_hint(),
        TrackingError::JobFailed {
            job_id: "mock-1".into(),
            message: String::new()
        }
        .recovery_hint()
    );
    assert_eq!(svc.status_calls(), 60);
    assert_eq!(svc.report_calls(), 0);
}
