//! Watching a submitted job until it reaches a terminal state.
//!
//! Two independent clocks run while a job is tracked: the [`poller`] asks the
//! service for real status, and the [`phase`] clock advances a cosmetic stage
//! indicator. They share nothing but a cancellation scope.

pub mod observer;
pub mod phase;
pub mod poller;
pub mod session;

pub use observer::{ChannelObserver, CollectObserver, PollEvent, PollObserver};
pub use phase::{PhaseEstimator, PhaseSnapshot, DEFAULT_PHASES};
pub use poller::{PollConfig, PollOutcome, Poller, PollerState};
pub use session::{TrackingConfig, TrackingSession};
