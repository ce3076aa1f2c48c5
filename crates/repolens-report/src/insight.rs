//! AI-enriched insight sections.
//!
//! Every field is optional: enrichment output varies between runs, and an
//! insight with a few populated fields is still worth showing.

use crate::de;
use crate::payload::Dimension;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One item in an insight list. Usually a sentence, sometimes an object such
/// as `{"title": ..., "impact": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Finding {
    Text(String),
    Detail(Map<String, Value>),
}

const HEADLINE_KEYS: &[&str] = &[
    "title",
    "issue",
    "name",
    "area",
    "principle",
    "pattern",
    "action",
    "recommendation",
    "description",
    "text",
];

impl Finding {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => Some(Finding::Detail(map.clone())),
            other => de::as_text(other).map(Finding::Text),
        }
    }

    /// Single-line form: the headline field, followed by the description
    /// when the headline is something else.
    pub fn summary(&self) -> String {
        let map = match self {
            Finding::Text(s) => return s.clone(),
            Finding::Detail(map) => map,
        };
        let headline = HEADLINE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(de::as_text).map(|t| (*key, t)));
        match headline {
            Some((key, head)) => {
                let description = map.get("description").and_then(de::as_text);
                match description {
                    Some(desc) if key != "description" => format!("{head}: {desc}"),
                    _ => head,
                }
            }
            None => map
                .values()
                .find_map(de::as_text)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        }
    }
}

// ── Architecture ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureInsight {
    pub pattern_justification: Option<PatternJustification>,
    pub quality_assessment: Option<ArchitectureAssessment>,
    #[serde(deserialize_with = "de::findings")]
    pub recommendations: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternJustification {
    #[serde(deserialize_with = "de::text")]
    pub primary_pattern: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub confidence_explanation: Option<String>,
    #[serde(deserialize_with = "de::findings")]
    pub evidence_analysis: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub alternative_patterns_considered: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureAssessment {
    #[serde(deserialize_with = "de::text")]
    pub overall_rating: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub layering_score: Option<f64>,
    #[serde(deserialize_with = "de::findings")]
    pub key_strengths: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub key_weaknesses: Vec<Finding>,
}

// ── Quality ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityInsight {
    #[serde(deserialize_with = "de::findings")]
    pub key_strengths: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub critical_issues: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub quick_wins: Vec<Finding>,
    pub maintainability_score: Option<Maintainability>,
    pub complexity_analysis: Option<ComplexityAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Maintainability {
    #[serde(deserialize_with = "de::number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub technical_debt_hours: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub long_term_cost: Option<String>,
    #[serde(deserialize_with = "de::findings")]
    pub refactoring_priorities: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityAnalysis {
    #[serde(deserialize_with = "de::text")]
    pub overall_assessment: Option<String>,
    #[serde(deserialize_with = "de::findings")]
    pub hotspots: Vec<Finding>,
}

// ── Principles ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinciplesInsight {
    pub solid_principles_analysis: Option<SolidAnalysis>,
    pub code_organization: Option<CodeOrganization>,
    #[serde(deserialize_with = "de::list")]
    pub actionable_roadmap: Vec<RoadmapStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidAnalysis {
    #[serde(deserialize_with = "de::text")]
    pub overall_adherence: Option<String>,
    pub single_responsibility: Option<PrincipleCheck>,
    pub dry_principle: Option<DuplicationCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrincipleCheck {
    #[serde(deserialize_with = "de::number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub violations_found: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub impact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicationCheck {
    #[serde(deserialize_with = "de::number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub duplication_level: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub estimated_waste: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeOrganization {
    #[serde(deserialize_with = "de::text")]
    pub structure_quality: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub modularity_score: Option<f64>,
    #[serde(deserialize_with = "de::findings")]
    pub improvements: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapStep {
    #[serde(deserialize_with = "de::text")]
    pub phase: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub effort_estimate: Option<String>,
    #[serde(deserialize_with = "de::findings")]
    pub actions: Vec<Finding>,
    #[serde(deserialize_with = "de::text")]
    pub expected_impact: Option<String>,
}

// ── Collaboration ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborationInsight {
    pub collaboration_score_breakdown: Option<ScoreBreakdown>,
    pub team_dynamics: Option<TeamDynamics>,
    pub knowledge_distribution: Option<KnowledgeDistribution>,
    #[serde(deserialize_with = "de::findings")]
    pub team_health_recommendations: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    #[serde(deserialize_with = "de::number")]
    pub current_score: Option<f64>,
    #[serde(deserialize_with = "de::findings")]
    pub factors_raising_score: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub factors_lowering_score: Vec<Finding>,
    #[serde(deserialize_with = "de::text")]
    pub realistic_improvement_target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamDynamics {
    #[serde(deserialize_with = "de::text")]
    pub collaboration_health: Option<String>,
    #[serde(deserialize_with = "de::findings")]
    pub key_observations: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub potential_concerns: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeDistribution {
    #[serde(deserialize_with = "de::text")]
    pub bus_factor_risk: Option<String>,
    #[serde(deserialize_with = "de::findings")]
    pub knowledge_silos: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub critical_areas: Vec<Finding>,
}

// ── Selection ──

/// A decoded insight for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Insight {
    Architecture(ArchitectureInsight),
    Quality(QualityInsight),
    Principles(PrinciplesInsight),
    Collaboration(CollaborationInsight),
}

impl Insight {
    /// Decode the insight object for `dimension`. `null`, an empty object,
    /// an object with no recognized fields, and anything that fails to
    /// decode count as absent.
    pub fn decode(dimension: Dimension, value: Option<&Value>) -> Option<Self> {
        let value = match value {
            Some(Value::Object(map)) if !map.is_empty() => Value::Object(map.clone()),
            Some(Value::Null) | None => return None,
            Some(Value::Object(_)) => return None,
            Some(other) => {
                tracing::warn!(dimension = dimension.as_str(), kind = %json_kind(other), "insight is not an object");
                return None;
            }
        };
        let decoded = match dimension {
            Dimension::Architecture => serde_json::from_value(value).map(Insight::Architecture),
            Dimension::Quality => serde_json::from_value(value).map(Insight::Quality),
            Dimension::Principles => serde_json::from_value(value).map(Insight::Principles),
            Dimension::Collaboration => serde_json::from_value(value).map(Insight::Collaboration),
        };
        match decoded {
            Ok(insight) if insight.is_empty() => {
                tracing::warn!(dimension = dimension.as_str(), "insight has no recognized fields");
                None
            }
            Ok(insight) => Some(insight),
            Err(e) => {
                tracing::warn!(dimension = dimension.as_str(), error = %e, "discarding malformed insight");
                None
            }
        }
    }

    /// True when nothing recognizable was decoded.
    pub fn is_empty(&self) -> bool {
        match self {
            Insight::Architecture(a) => *a == ArchitectureInsight::default(),
            Insight::Quality(q) => *q == QualityInsight::default(),
            Insight::Principles(p) => *p == PrinciplesInsight::default(),
            Insight::Collaboration(c) => *c == CollaborationInsight::default(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
