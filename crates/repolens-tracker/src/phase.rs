//! Simulated progress.
//!
//! The service reports no phase-level progress, so the stage shown to the
//! user is advanced by a timer alone. It never reads job status and says
//! nothing about how close the job is to completion. Replace this module
//! when the service exposes real phases; the poller does not depend on it.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PHASES: &[&str] = &[
    "Ingestion",
    "Architecture",
    "Quality",
    "Principles",
    "Collaboration",
    "AI Insights",
];

pub const DEFAULT_PHASE_INTERVAL: Duration = Duration::from_secs(8);

/// What the progress display should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSnapshot {
    pub index: usize,
    pub count: usize,
    pub name: &'static str,
    pub active: bool,
}

impl PhaseSnapshot {
    /// 1-based position, for "step 2 of 6".
    pub fn step(&self) -> usize {
        self.index + 1
    }
}

/// Counter behind the display. `current` stays in `[0, count-1]`, only grows
/// while active, and returns to 0 on every start and stop.
#[derive(Debug, Clone)]
pub struct PhaseEstimator {
    phases: &'static [&'static str],
    current: usize,
    active: bool,
}

impl PhaseEstimator {
    pub fn new(phases: &'static [&'static str]) -> Self {
        let phases = if phases.is_empty() { DEFAULT_PHASES } else { phases };
        Self {
            phases,
            current: 0,
            active: false,
        }
    }

    pub fn start(&mut self) {
        self.current = 0;
        self.active = true;
    }

    /// Move one phase forward, holding at the last one.
    pub fn advance(&mut self) -> usize {
        if self.active && self.current + 1 < self.phases.len() {
            self.current += 1;
        }
        self.current
    }

    pub fn stop(&mut self) {
        self.current = 0;
        self.active = false;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            index: self.current,
            count: self.phases.len(),
            name: self.phases[self.current],
            active: self.active,
        }
    }
}

/// Drive an estimator on a fixed interval until `cancel` fires, publishing
/// every change. The final published snapshot is the reset, inactive one.
pub async fn run_phase_clock(
    phases: &'static [&'static str],
    interval: Duration,
    cancel: CancellationToken,
    tx: watch::Sender<PhaseSnapshot>,
) {
    let mut estimator = PhaseEstimator::new(phases);
    estimator.start();
    tx.send_replace(estimator.snapshot());

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let before = estimator.current();
                if estimator.advance() != before {
                    tx.send_replace(estimator.snapshot());
                }
            }
        }
    }

    estimator.stop();
    tx.send_replace(estimator.snapshot());
}
