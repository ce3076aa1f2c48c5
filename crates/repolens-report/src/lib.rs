//! Turning a completed job's report into something a person can read.
//!
//! Each of the four dimensions shows its AI insight when the enrichment step
//! has produced one and a raw-metrics fallback otherwise. Scores are passed
//! through from the service as-is.

pub mod assemble;
mod de;
pub mod insight;
pub mod payload;
pub mod raw;
pub mod render;
pub mod score;

pub use assemble::{assemble, assemble_payload, ReportBundle, ScoreSummary, Section, SectionContent};
pub use insight::{Finding, Insight};
pub use payload::{Dimension, ReportPayload};
pub use raw::RawData;
pub use render::render_text;
pub use score::{grade, HireRecommendation, HireVerdict};
