use crate::de;
use crate::insight::Finding;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four analysis dimensions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Architecture,
    Quality,
    Principles,
    Collaboration,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Architecture,
        Dimension::Quality,
        Dimension::Principles,
        Dimension::Collaboration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Architecture => "architecture",
            Dimension::Quality => "quality",
            Dimension::Principles => "principles",
            Dimension::Collaboration => "collaboration",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Dimension::Architecture => "Architecture",
            Dimension::Quality => "Code Quality",
            Dimension::Principles => "Design Principles",
            Dimension::Collaboration => "Collaboration",
        }
    }
}

/// Body of `GET /analyze/{id}/report/`. Every field may be missing; the
/// assembler falls back to the requested job id when `id` is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportPayload {
    #[serde(deserialize_with = "repolens_client::deserialize_id")]
    pub id: String,
    #[serde(alias = "repo_url", deserialize_with = "de::text")]
    pub repository_url: Option<String>,
    pub repository: Option<RepositoryInfo>,

    #[serde(deserialize_with = "de::number")]
    pub overall_score: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub architecture_score: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub quality_score: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub principles_score: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub collaboration_score: Option<f64>,
    pub analysis: Option<AnalysisSummary>,

    pub architecture_data: Option<Value>,
    pub quality_data: Option<Value>,
    pub principles_data: Option<Value>,
    pub collaboration_data: Option<Value>,
    pub insights: Option<InsightSet>,

    #[serde(deserialize_with = "de::text")]
    pub ai_executive_summary: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub ai_hire_recommendation: Option<String>,
    pub ai_developer_guide: Option<Value>,
    #[serde(deserialize_with = "de::count")]
    pub ai_total_tokens: Option<u64>,
    #[serde(deserialize_with = "de::count")]
    pub ai_processing_time_ms: Option<u64>,

    #[serde(deserialize_with = "de::text")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryInfo {
    #[serde(deserialize_with = "de::text")]
    pub owner: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de::count")]
    pub stars: Option<u64>,
    #[serde(deserialize_with = "de::count")]
    pub forks: Option<u64>,
    #[serde(deserialize_with = "de::text")]
    pub primary_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisSummary {
    #[serde(deserialize_with = "de::number")]
    pub overall_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InsightSet {
    pub architecture: Option<Value>,
    pub quality: Option<Value>,
    pub principles: Option<Value>,
    pub collaboration: Option<Value>,
}

impl ReportPayload {
    pub fn insight_value(&self, dimension: Dimension) -> Option<&Value> {
        let set = self.insights.as_ref()?;
        match dimension {
            Dimension::Architecture => set.architecture.as_ref(),
            Dimension::Quality => set.quality.as_ref(),
            Dimension::Principles => set.principles.as_ref(),
            Dimension::Collaboration => set.collaboration.as_ref(),
        }
    }

    pub fn raw_value(&self, dimension: Dimension) -> Option<&Value> {
        match dimension {
            Dimension::Architecture => self.architecture_data.as_ref(),
            Dimension::Quality => self.quality_data.as_ref(),
            Dimension::Principles => self.principles_data.as_ref(),
            Dimension::Collaboration => self.collaboration_data.as_ref(),
        }
    }

    /// Aggregate score as reported: top-level first, then `analysis`.
    pub fn reported_overall_score(&self) -> Option<f64> {
        self.overall_score
            .or_else(|| self.analysis.as_ref().and_then(|a| a.overall_score))
    }

    /// `ai_developer_guide.learning_path`, empty when absent.
    pub fn learning_path(&self) -> Vec<Finding> {
        match self.ai_developer_guide.as_ref().and_then(|g| g.get("learning_path")) {
            Some(Value::Array(items)) => items.iter().filter_map(Finding::from_value).collect(),
            Some(other) => Finding::from_value(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// The top-level sub-score for `dimension`, if the service sent one.
    pub fn top_level_score(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Architecture => self.architecture_score,
            Dimension::Quality => self.quality_score,
            Dimension::Principles => self.principles_score,
            Dimension::Collaboration => self.collaboration_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_payload_decodes() {
        let p: ReportPayload = serde_json::from_value(json!({"id": 17})).unwrap();
        assert_eq!(p.id, "17");
        assert!(p.insights.is_none());
        assert_eq!(p.reported_overall_score(), None);
    }

    #[test]
    fn overall_score_falls_back_to_analysis_block() {
        let p: ReportPayload =
            serde_json::from_value(json!({"id": "a", "analysis": {"overall_score": 77.5}})).unwrap();
        assert_eq!(p.reported_overall_score(), Some(77.5));
        let p: ReportPayload = serde_json::from_value(
            json!({"id": "a", "overall_score": 80, "analysis": {"overall_score": 77.5}}),
        )
        .unwrap();
        assert_eq!(p.reported_overall_score(), Some(80.0));
    }

    #[test]
    fn insight_lookup_by_dimension() {
        let p: ReportPayload = serde_json::from_value(json!({
            "id": "a",
            "insights": {"quality": {"key_strengths": ["x"]}, "principles": null}
        }))
        .unwrap();
        assert!(p.insight_value(Dimension::Quality).is_some());
        assert!(p.insight_value(Dimension::Principles).is_none());
        assert!(p.insight_value(Dimension::Architecture).is_none());
    }

    #[test]
    fn learning_path_tolerates_shapes() {
        let p: ReportPayload = serde_json::from_value(json!({
            "id": "a",
            "ai_developer_guide": {"learning_path": ["Read src/lib.rs", {"title": "Trace a request"}]}
        }))
        .unwrap();
        assert_eq!(p.learning_path().len(), 2);
        let p: ReportPayload =
            serde_json::from_value(json!({"id": "a", "ai_developer_guide": "soon"})).unwrap();
        assert!(p.learning_path().is_empty());
    }
}
