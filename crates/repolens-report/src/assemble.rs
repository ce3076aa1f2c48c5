//! Merging AI insights with raw metrics, one dimension at a time.

use crate::insight::{Finding, Insight};
use crate::payload::{Dimension, ReportPayload, RepositoryInfo};
use crate::raw::{self, RawData};
use crate::score::{grade, HireRecommendation};
use repolens_client::AnalysisService;
use repolens_core::{ClientError, ReportFetchError};
use serde::Serialize;

/// What a section shows. Exactly one source per dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "data", rename_all = "snake_case")]
pub enum SectionContent {
    Enriched(Insight),
    Fallback(RawData),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub dimension: Dimension,
    /// As reported by the service, never recomputed.
    pub score: Option<f64>,
    pub content: SectionContent,
}

impl Section {
    pub fn is_enriched(&self) -> bool {
        matches!(self.content, SectionContent::Enriched(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub overall: Option<f64>,
    pub grade: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiUsage {
    pub total_tokens: Option<u64>,
    pub processing_time_ms: Option<u64>,
}

/// Everything the report view needs, assembled from one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    pub job_id: String,
    pub repository_url: Option<String>,
    pub repository: Option<RepositoryInfo>,
    pub score: ScoreSummary,
    /// One per dimension, in [`Dimension::ALL`] order.
    pub sections: Vec<Section>,
    pub executive_summary: Option<String>,
    pub hire_recommendation: Option<HireRecommendation>,
    pub learning_path: Vec<Finding>,
    pub ai_usage: Option<AiUsage>,
    pub completed_at: Option<String>,
}

impl ReportBundle {
    pub fn section(&self, dimension: Dimension) -> Option<&Section> {
        self.sections.iter().find(|s| s.dimension == dimension)
    }

    pub fn enriched_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_enriched()).count()
    }

    pub fn is_fully_enriched(&self) -> bool {
        self.enriched_count() == self.sections.len()
    }
}

/// Fetch the report for a completed job and assemble it.
///
/// A failed or undecodable fetch is returned as an error; no partial bundle
/// is ever produced.
pub async fn assemble(
    service: &dyn AnalysisService,
    job_id: &str,
) -> Result<ReportBundle, ReportFetchError> {
    let fetch_error = |source| ReportFetchError {
        job_id: job_id.to_string(),
        source,
    };
    let value = service.report(job_id).await.map_err(fetch_error)?;
    let payload: ReportPayload = serde_json::from_value(value).map_err(|e| {
        fetch_error(ClientError::Decode {
            status: 200,
            reason: format!("report payload: {e}"),
        })
    })?;
    let bundle = assemble_payload(job_id, payload);
    tracing::debug!(
        job_id,
        enriched = bundle.enriched_count(),
        "report assembled"
    );
    Ok(bundle)
}

/// Build a bundle from an already-fetched payload.
pub fn assemble_payload(job_id: &str, payload: ReportPayload) -> ReportBundle {
    let sections = Dimension::ALL
        .into_iter()
        .map(|dimension| assemble_section(&payload, dimension))
        .collect();

    let overall = payload.reported_overall_score();
    let ai_usage = (payload.ai_total_tokens.is_some() || payload.ai_processing_time_ms.is_some())
        .then(|| AiUsage {
            total_tokens: payload.ai_total_tokens,
            processing_time_ms: payload.ai_processing_time_ms,
        });

    ReportBundle {
        job_id: if payload.id.is_empty() {
            job_id.to_string()
        } else {
            payload.id.clone()
        },
        repository_url: payload.repository_url.clone(),
        repository: payload.repository.clone(),
        score: ScoreSummary {
            overall,
            grade: overall.map(grade),
        },
        sections,
        executive_summary: payload.ai_executive_summary.clone(),
        hire_recommendation: payload
            .ai_hire_recommendation
            .as_deref()
            .map(HireRecommendation::classify),
        learning_path: payload.learning_path(),
        ai_usage,
        completed_at: payload.completed_at.clone(),
    }
}

fn assemble_section(payload: &ReportPayload, dimension: Dimension) -> Section {
    let raw = decode_raw(dimension, payload);
    let score = payload
        .top_level_score(dimension)
        .or_else(|| raw_score(&raw));
    let content = match Insight::decode(dimension, payload.insight_value(dimension)) {
        Some(insight) => SectionContent::Enriched(insight),
        None => SectionContent::Fallback(raw),
    };
    Section {
        dimension,
        score,
        content,
    }
}

fn decode_raw(dimension: Dimension, payload: &ReportPayload) -> RawData {
    let value = payload.raw_value(dimension);
    let name = dimension.as_str();
    match dimension {
        Dimension::Architecture => RawData::Architecture(raw::decode_or_default(name, value)),
        Dimension::Quality => RawData::Quality(raw::decode_or_default(name, value)),
        Dimension::Principles => RawData::Principles(raw::decode_or_default(name, value)),
        Dimension::Collaboration => RawData::Collaboration(raw::decode_or_default(name, value)),
    }
}

fn raw_score(raw: &RawData) -> Option<f64> {
    match raw {
        RawData::Architecture(a) => a.headline_score(),
        RawData::Quality(q) => q.scores.as_ref().and_then(|s| s.overall),
        RawData::Principles(p) => p.principle_score,
        RawData::Collaboration(c) => c.collaboration_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_client::MockService;
    use serde_json::json;

    fn half_enriched() -> serde_json::Value {
        json!({
            "id": 42,
            "repository_url": "https://github.com/octocat/Hello-World",
            "overall_score": 78.4,
            "quality_score": 81.0,
            "architecture_data": {"primary_pattern": "Layered", "confidence": 72},
            "quality_data": {"scores": {"overall": 80.0}},
            "principles_data": {"principle_score": 64.5, "grade": "C", "violations": []},
            "collaboration_data": {"bus_factor": 1, "collaboration_score": 55.0},
            "insights": {
                "architecture": {"pattern_justification": {"primary_pattern": "Layered"}},
                "quality": {"key_strengths": ["Consistent naming"]},
                "principles": null
            },
            "ai_hire_recommendation": "Yes - solid fundamentals",
            "ai_total_tokens": 5120
        })
    }

    #[test]
    fn two_enriched_two_fallback() {
        let payload = serde_json::from_value(half_enriched()).unwrap();
        let bundle = assemble_payload("42", payload);

        assert_eq!(bundle.sections.len(), 4);
        assert_eq!(bundle.enriched_count(), 2);
        assert!(!bundle.is_fully_enriched());
        let sources: Vec<(Dimension, bool)> = bundle
            .sections
            .iter()
            .map(|s| (s.dimension, s.is_enriched()))
            .collect();
        assert_eq!(
            sources,
            vec![
                (Dimension::Architecture, true),
                (Dimension::Quality, true),
                (Dimension::Principles, false),
                (Dimension::Collaboration, false),
            ]
        );
        assert!(matches!(
            bundle.section(Dimension::Principles).unwrap().content,
            SectionContent::Fallback(RawData::Principles(_))
        ));
    }

    #[test]
    fn scores_are_taken_not_computed() {
        let payload = serde_json::from_value(half_enriched()).unwrap();
        let bundle = assemble_payload("42", payload);
        assert_eq!(bundle.score.overall, Some(78.4));
        assert_eq!(bundle.score.grade, Some("B"));
        // top-level wins over raw
        assert_eq!(bundle.section(Dimension::Quality).unwrap().score, Some(81.0));
        // raw fills gaps
        assert_eq!(bundle.section(Dimension::Principles).unwrap().score, Some(64.5));
        assert_eq!(bundle.section(Dimension::Architecture).unwrap().score, Some(72.0));
    }

    #[test]
    fn missing_raw_data_still_renders_a_fallback() {
        let payload = serde_json::from_value(json!({"id": "x"})).unwrap();
        let bundle = assemble_payload("x", payload);
        assert_eq!(bundle.enriched_count(), 0);
        assert!(bundle.sections.iter().all(|s| !s.is_enriched()));
        assert_eq!(bundle.score.overall, None);
        assert_eq!(bundle.score.grade, None);
        assert!(bundle.ai_usage.is_none());
    }

    #[test]
    fn malformed_insight_falls_back() {
        let payload = serde_json::from_value(json!({
            "id": "x",
            "insights": {"quality": {"maintainability_score": "soon"}}
        }))
        .unwrap();
        let bundle = assemble_payload("x", payload);
        assert!(!bundle.section(Dimension::Quality).unwrap().is_enriched());
    }

    #[test]
    fn insight_without_known_fields_falls_back_to_raw_metrics() {
        let payload = serde_json::from_value(json!({
            "id": "x",
            "quality_data": {"scores": {"overall": 80}, "strengths": ["Good naming"]},
            "insights": {"quality": {"summary": "Readable, well-tested code"}}
        }))
        .unwrap();
        let bundle = assemble_payload("x", payload);
        let quality = bundle.section(Dimension::Quality).unwrap();
        assert!(!quality.is_enriched());
        assert_eq!(quality.score, Some(80.0));

        let text = crate::render_text(&bundle);
        assert!(text.contains("Good naming"), "{text}");
        assert!(text.contains("0 of 4 AI sections ready"));
    }

    #[test]
    fn extras_are_carried() {
        let payload = serde_json::from_value(half_enriched()).unwrap();
        let bundle = assemble_payload("42", payload);
        assert_eq!(bundle.job_id, "42");
        assert_eq!(
            bundle.hire_recommendation.unwrap().verdict,
            crate::score::HireVerdict::Yes
        );
        assert_eq!(bundle.ai_usage.unwrap().total_tokens, Some(5120));
    }

    #[test]
    fn bundle_serializes_with_section_sources() {
        let payload = serde_json::from_value(half_enriched()).unwrap();
        let json = serde_json::to_value(assemble_payload("42", payload)).unwrap();
        assert_eq!(json["sections"][0]["dimension"], "architecture");
        assert_eq!(json["sections"][0]["content"]["source"], "enriched");
        assert_eq!(json["sections"][2]["content"]["source"], "fallback");
    }

    #[tokio::test]
    async fn fetch_failure_yields_no_bundle() {
        let svc = MockService::new();
        svc.push_report(Err(ClientError::Rejected {
            status: 500,
            message: "Internal error".into(),
            details: Default::default(),
        }));
        let err = assemble(&svc, "42").await.unwrap_err();
        assert_eq!(err.job_id, "42");
        assert!(err.recovery_hint().contains("repolens analyze"));
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_fetch_error() {
        let svc = MockService::new();
        svc.push_report(Ok(json!("not a report")));
        let err = assemble(&svc, "42").await.unwrap_err();
        assert!(matches!(err.source, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn fetches_once_and_assembles() {
        let svc = MockService::new();
        svc.push_report(Ok(half_enriched()));
        let bundle = assemble(&svc, "42").await.unwrap();
        assert_eq!(bundle.enriched_count(), 2);
        assert_eq!(svc.report_calls(), 1);
    }
}
