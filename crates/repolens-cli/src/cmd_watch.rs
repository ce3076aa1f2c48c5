use crate::context::{ctrlc_cancel, runtime, Context};
use crate::PollArgs;
use anyhow::{bail, Result};
use repolens_client::AnalysisService;
use repolens_core::{AnalysisJob, JobStatus, TrackingError};
use repolens_tracker::{PhaseSnapshot, PollEvent, PollOutcome, TrackingConfig, TrackingSession};
use std::sync::Arc;

/// Execute `repolens watch <id>`
pub fn execute(api: Option<&str>, id: &str, json: bool, poll: &PollArgs) -> Result<()> {
    let ctx = Context::load(api).with_poll(poll);
    let service = ctx.service();
    let rt = runtime()?;
    rt.block_on(watch(service, id, json, ctx.tracking()))
}

/// Attach to an existing job. The job starts as pending and only polls move
/// it forward, so an unreachable service on the first check is retried like
/// any other tick.
pub async fn watch(
    service: Arc<dyn AnalysisService>,
    id: &str,
    json: bool,
    config: TrackingConfig,
) -> Result<()> {
    println!("Watching analysis {id}");
    let outcome = track(service.clone(), AnalysisJob::pending(id, ""), config).await;
    finish(service.as_ref(), outcome, json).await
}

/// Follow `job` until polling ends, printing progress to stderr.
pub async fn track(
    service: Arc<dyn AnalysisService>,
    job: AnalysisJob,
    config: TrackingConfig,
) -> PollOutcome {
    let mut session = TrackingSession::spawn(service, job, config);
    ctrlc_cancel(session.cancel_token());
    let mut phase = session.phase();
    let mut phase_open = true;

    loop {
        tokio::select! {
            event = session.next_event() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            changed = phase.changed(), if phase_open => match changed {
                Ok(()) => print_phase(&phase.borrow_and_update()),
                Err(_) => phase_open = false,
            },
        }
    }
    session.wait().await
}

fn print_event(event: &PollEvent) {
    match event {
        PollEvent::StatusChanged(job) => match job.status {
            JobStatus::Failed => {}
            status => eprintln!("  status: {status}"),
        },
        PollEvent::TickFailed { attempt, error } => {
            eprintln!("  check {attempt} failed ({error}); retrying");
        }
        PollEvent::Finished(_) => {}
    }
}

fn print_phase(snap: &PhaseSnapshot) {
    if snap.active {
        eprintln!(
            "  [{}/{}] {} (estimated)",
            snap.step(),
            snap.count,
            snap.name
        );
    }
}

/// Turn a polling outcome into the next view: the report on success, a
/// category-specific message otherwise.
pub async fn finish(service: &dyn AnalysisService, outcome: PollOutcome, json: bool) -> Result<()> {
    match outcome.into_result() {
        Ok(job) => crate::cmd_report::show(service, &job.id, json).await,
        Err(err @ TrackingError::Cancelled { .. }) => {
            eprintln!("Stopped watching; the job continues server-side.");
            eprintln!("{}", err.recovery_hint());
            Ok(())
        }
        Err(err) => bail!("{}", describe(&err)),
    }
}

/// Message plus recovery hint. Failure and timeout never read the same.
pub fn describe(err: &TrackingError) -> String {
    let headline = match err {
        TrackingError::JobFailed { message, .. } => format!("Analysis failed: {message}"),
        TrackingError::PollingTimedOut { attempts, .. } => {
            format!("Still running after {attempts} status checks; stopped waiting.")
        }
        TrackingError::Cancelled { .. } => "Stopped watching.".to_string(),
    };
    format!("{headline}\n{}", err.recovery_hint())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_client::mock::{failed_snapshot, snapshot};
    use repolens_client::MockService;
    use repolens_core::ClientError;
    use repolens_tracker::PollConfig;
    use std::time::Duration;

    #[test]
    fn failure_and_timeout_read_differently() {
        let failed = describe(&TrackingError::JobFailed {
            job_id: "7".into(),
            message: "rate limited".into(),
        });
        let timed_out = describe(&TrackingError::PollingTimedOut {
            job_id: "7".into(),
            attempts: 60,
        });
        assert!(failed.starts_with("Analysis failed: rate limited"));
        assert!(failed.contains("resubmit"));
        assert!(timed_out.contains("repolens status 7"));
        assert_ne!(failed, timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_retries_when_first_check_fails() {
        let svc = Arc::new(MockService::new());
        svc.push_status(Err(ClientError::Network("connection refused".into())))
            .push_status(Ok(snapshot("7", JobStatus::Completed)));
        svc.push_report(Ok(serde_json::json!({"id": "7", "overall_score": 88})));

        watch(svc.clone(), "7", true, TrackingConfig::default())
            .await
            .unwrap();

        assert_eq!(svc.status_calls(), 2);
        assert_eq!(svc.report_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_surfaces_message_without_report() {
        let svc = Arc::new(MockService::new());
        svc.push_status(Ok(failed_snapshot("7", "rate limited")));
        let config = TrackingConfig {
            poll: PollConfig {
                interval: Duration::from_secs(2),
                max_attempts: 60,
            },
            ..TrackingConfig::default()
        };

        let outcome = track(svc.clone(), AnalysisJob::pending("7", "https://github.com/a/b"), config).await;
        let err = finish(svc.as_ref(), outcome, false).await.unwrap_err();

        assert!(err.to_string().contains("rate limited"));
        assert_eq!(svc.report_calls(), 0);
    }
}
