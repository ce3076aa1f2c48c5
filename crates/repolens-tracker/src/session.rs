use crate::observer::{ChannelObserver, PollEvent};
use crate::phase::{run_phase_clock, PhaseEstimator, PhaseSnapshot, DEFAULT_PHASES, DEFAULT_PHASE_INTERVAL};
use crate::poller::{PollConfig, PollOutcome, Poller};
use repolens_client::AnalysisService;
use repolens_core::AnalysisJob;
use repolens_store::Settings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct TrackingConfig {
    pub poll: PollConfig,
    pub phase_interval: Duration,
    pub phases: &'static [&'static str],
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            phase_interval: DEFAULT_PHASE_INTERVAL,
            phases: DEFAULT_PHASES,
        }
    }
}

impl From<&Settings> for TrackingConfig {
    fn from(s: &Settings) -> Self {
        Self {
            poll: PollConfig::from(s),
            phase_interval: Duration::from_secs(s.phase_interval_secs.max(1)),
            phases: DEFAULT_PHASES,
        }
    }
}

/// One job being watched: a poller task and a phase clock task sharing a
/// cancellation scope.
///
/// The phase clock stops when polling ends for any reason. Dropping the
/// session cancels both, so no timer outlives the view that started it.
pub struct TrackingSession {
    job: AnalysisJob,
    events: mpsc::UnboundedReceiver<PollEvent>,
    phase: watch::Receiver<PhaseSnapshot>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<PollOutcome>>,
}

impl TrackingSession {
    /// Start tracking. Must be called inside a tokio runtime.
    pub fn spawn(
        service: Arc<dyn AnalysisService>,
        job: AnalysisJob,
        config: TrackingConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let clock_cancel = cancel.child_token();

        let (phase_tx, phase_rx) = watch::channel(PhaseEstimator::new(config.phases).snapshot());
        let clock = tokio::spawn(run_phase_clock(
            config.phases,
            config.phase_interval,
            clock_cancel.clone(),
            phase_tx,
        ));

        let (tx, rx) = mpsc::unbounded_channel();
        let poller = Poller::new(service, config.poll);
        let poll_cancel = cancel.clone();
        let tracked = job.clone();
        let handle = tokio::spawn(async move {
            let observer = ChannelObserver::new(tx);
            let outcome = poller.run(tracked, &observer, &poll_cancel).await;
            clock_cancel.cancel();
            if let Err(e) = clock.await {
                tracing::debug!(error = %e, "phase clock task ended abnormally");
            }
            outcome
        });

        tracing::debug!(job_id = %job.id, "tracking started");
        Self {
            job,
            events: rx,
            phase: phase_rx,
            cancel,
            handle: Some(handle),
        }
    }

    /// Next poll event, or `None` once the poller has finished and every
    /// event has been drained.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// A receiver for the simulated phase.
    pub fn phase(&self) -> watch::Receiver<PhaseSnapshot> {
        self.phase.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for polling to end.
    pub async fn wait(mut self) -> PollOutcome {
        let Some(handle) = self.handle.take() else {
            return PollOutcome::Cancelled {
                job: self.job.clone(),
                attempts: 0,
            };
        };
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(job_id = %self.job.id, error = %e, "poll task ended abnormally");
                PollOutcome::Cancelled {
                    job: self.job.clone(),
                    attempts: 0,
                }
            }
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
