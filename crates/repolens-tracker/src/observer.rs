use crate::poller::PollOutcome;
use repolens_core::AnalysisJob;
use tokio::sync::mpsc;

/// Something the poller reports while a job is being tracked.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// The job's status or failure message changed.
    StatusChanged(AnalysisJob),
    /// One status request failed; polling continues.
    TickFailed { attempt: u32, error: String },
    Finished(PollOutcome),
}

/// Receives poll events.
#[async_trait::async_trait]
pub trait PollObserver: Send + Sync {
    async fn on_event(&self, event: PollEvent);
}

/// Forwards events into a channel. A closed receiver is ignored.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<PollEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<PollEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl PollObserver for ChannelObserver {
    async fn on_event(&self, event: PollEvent) {
        let _ = self.tx.send(event);
    }
}

/// Collects events in memory (for testing).
#[derive(Default)]
pub struct CollectObserver {
    events: std::sync::Mutex<Vec<PollEvent>>,
}

impl CollectObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PollObserver for CollectObserver {
    async fn on_event(&self, event: PollEvent) {
        self.events.lock().unwrap().push(event);
    }
}
