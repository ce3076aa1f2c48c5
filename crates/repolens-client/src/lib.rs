//! Client side of the analysis service contract.
//!
//! [`AnalysisService`] is the seam: [`HttpService`] talks to the real service,
//! [`MockService`] replays scripted responses in tests.

pub mod http;
pub mod mock;
pub mod service;
pub mod submit;
pub mod wire;

pub use http::HttpService;
pub use mock::MockService;
pub use service::AnalysisService;
pub use submit::{submit, normalize_token};
pub use wire::{deserialize_id, HealthStatus, JobSnapshot, SubmitRequest};
