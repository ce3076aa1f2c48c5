//! Fixed-interval status polling with a hard attempt ceiling.

use crate::observer::{PollEvent, PollObserver};
use repolens_client::AnalysisService;
use repolens_core::{AnalysisJob, JobStatus, TrackingError};
use repolens_store::Settings;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Every tick counts, including ticks whose request failed.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&Settings> for PollConfig {
    fn from(s: &Settings) -> Self {
        Self {
            interval: Duration::from_secs(s.poll_interval_secs.max(1)),
            max_attempts: s.max_attempts.max(1),
        }
    }
}

/// Poller lifecycle: `Idle -> Polling -> {Completed | Failed | TimedOut | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl PollerState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PollerState::Idle | PollerState::Polling)
    }
}

/// How a polling run ended, with the last known job and the number of status
/// requests issued.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed { job: AnalysisJob, attempts: u32 },
    Failed { job: AnalysisJob, attempts: u32 },
    /// Attempt ceiling reached. The job may still be running server-side.
    TimedOut { job: AnalysisJob, attempts: u32 },
    Cancelled { job: AnalysisJob, attempts: u32 },
}

impl PollOutcome {
    pub fn job(&self) -> &AnalysisJob {
        match self {
            PollOutcome::Completed { job, .. }
            | PollOutcome::Failed { job, .. }
            | PollOutcome::TimedOut { job, .. }
            | PollOutcome::Cancelled { job, .. } => job,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Completed { attempts, .. }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::TimedOut { attempts, .. }
            | PollOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn state(&self) -> PollerState {
        match self {
            PollOutcome::Completed { .. } => PollerState::Completed,
            PollOutcome::Failed { .. } => PollerState::Failed,
            PollOutcome::TimedOut { .. } => PollerState::TimedOut,
            PollOutcome::Cancelled { .. } => PollerState::Cancelled,
        }
    }

    /// Only `Completed` may lead to a report fetch.
    pub fn into_result(self) -> Result<AnalysisJob, TrackingError> {
        match self {
            PollOutcome::Completed { job, .. } => Ok(job),
            PollOutcome::Failed { job, .. } => Err(TrackingError::JobFailed {
                message: job
                    .error_message
                    .clone()
                    .unwrap_or_else(|| repolens_core::DEFAULT_FAILURE_MESSAGE.to_string()),
                job_id: job.id,
            }),
            PollOutcome::TimedOut { job, attempts } => Err(TrackingError::PollingTimedOut {
                job_id: job.id,
                attempts,
            }),
            PollOutcome::Cancelled { job, .. } => Err(TrackingError::Cancelled { job_id: job.id }),
        }
    }
}

pub struct Poller {
    service: Arc<dyn AnalysisService>,
    config: PollConfig,
}

impl Poller {
    pub fn new(service: Arc<dyn AnalysisService>, config: PollConfig) -> Self {
        Self { service, config }
    }

    /// Poll `job` until it reaches a terminal status, the attempt ceiling is
    /// hit, or `cancel` fires.
    ///
    /// The first request goes out one interval after the call. A failed
    /// request is logged, reported to `observer` and retried on the next
    /// tick. A response that arrives after cancellation is discarded.
    pub async fn run(
        &self,
        mut job: AnalysisJob,
        observer: &dyn PollObserver,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        if job.status.is_terminal() {
            let outcome = terminal_outcome(job, 0);
            observer.on_event(PollEvent::Finished(outcome.clone())).await;
            return outcome;
        }

        let mut state = PollerState::Idle;
        transition(&job.id, &mut state, PollerState::Polling);

        let interval = self.config.interval;
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts = 0u32;

        let outcome = loop {
            tokio::select! {
                _ = cancel.cancelled() => break PollOutcome::Cancelled { job, attempts },
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let response = self.service.job_status(&job.id).await;
            if cancel.is_cancelled() {
                tracing::debug!(job_id = %job.id, attempt = attempts, "discarding status response after cancel");
                break PollOutcome::Cancelled { job, attempts };
            }

            match response {
                Ok(snapshot) => {
                    if job.observe(snapshot.status, snapshot.error_message) {
                        tracing::debug!(job_id = %job.id, status = job.status.as_str(), attempt = attempts, "status changed");
                        observer.on_event(PollEvent::StatusChanged(job.clone())).await;
                    }
                    if job.status.is_terminal() {
                        break terminal_outcome(job, attempts);
                    }
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.id, attempt = attempts, error = %e, "status check failed");
                    observer
                        .on_event(PollEvent::TickFailed {
                            attempt: attempts,
                            error: e.to_string(),
                        })
                        .await;
                }
            }

            if attempts >= self.config.max_attempts {
                break PollOutcome::TimedOut { job, attempts };
            }
        };

        transition(&outcome.job().id, &mut state, outcome.state());
        observer.on_event(PollEvent::Finished(outcome.clone())).await;
        outcome
    }
}

fn terminal_outcome(job: AnalysisJob, attempts: u32) -> PollOutcome {
    match job.status {
        JobStatus::Failed => PollOutcome::Failed { job, attempts },
        _ => PollOutcome::Completed { job, attempts },
    }
}

fn transition(job_id: &str, state: &mut PollerState, next: PollerState) {
    tracing::debug!(job_id, from = ?*state, to = ?next, "poller state");
    *state = next;
}
