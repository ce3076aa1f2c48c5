//! Deterministic metrics computed by the service's analyzers, shown when a
//! dimension has no insight yet.

use crate::de;
use crate::insight::Finding;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureData {
    #[serde(deserialize_with = "de::text")]
    pub primary_pattern: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub confidence: Option<f64>,
    #[serde(deserialize_with = "de::list")]
    pub signals: Vec<PatternSignal>,
    #[serde(deserialize_with = "de::findings")]
    pub detected_patterns: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSignal {
    #[serde(alias = "name", deserialize_with = "de::text")]
    pub pattern: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub confidence: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub confidence_level: Option<String>,
}

/// Signals shown in the architecture fallback.
pub const MIN_SIGNAL_CONFIDENCE: f64 = 50.0;
pub const MAX_SIGNALS: usize = 3;

impl ArchitectureData {
    /// Up to three named signals at or above the confidence floor, in
    /// payload order.
    pub fn strong_signals(&self) -> Vec<&PatternSignal> {
        self.signals
            .iter()
            .filter(|s| s.pattern.is_some())
            .filter(|s| s.confidence.is_some_and(|c| c >= MIN_SIGNAL_CONFIDENCE))
            .take(MAX_SIGNALS)
            .collect()
    }

    pub fn headline_score(&self) -> Option<f64> {
        self.score.or(self.confidence)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityData {
    pub scores: Option<QualityScores>,
    #[serde(deserialize_with = "de::findings")]
    pub strengths: Vec<Finding>,
    #[serde(deserialize_with = "de::findings")]
    pub issues: Vec<Finding>,
    pub file_metrics: Option<FileMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityScores {
    #[serde(deserialize_with = "de::number")]
    pub overall: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub complexity: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub tests: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub documentation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetrics {
    #[serde(deserialize_with = "de::count")]
    pub total_files: Option<u64>,
    #[serde(deserialize_with = "de::count")]
    pub total_lines: Option<u64>,
    #[serde(deserialize_with = "de::number")]
    pub avg_file_length: Option<f64>,
    #[serde(deserialize_with = "de::count")]
    pub max_file_length: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinciplesData {
    #[serde(deserialize_with = "de::number")]
    pub principle_score: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub grade: Option<String>,
    #[serde(deserialize_with = "de::list")]
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Violation {
    #[serde(deserialize_with = "de::text")]
    pub principle: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub severity: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub file_path: Option<String>,
}

pub const MAX_VIOLATIONS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborationData {
    #[serde(deserialize_with = "de::count")]
    pub bus_factor: Option<u64>,
    #[serde(deserialize_with = "de::count")]
    pub active_contributors_count: Option<u64>,
    #[serde(deserialize_with = "de::number")]
    pub collaboration_score: Option<f64>,
    #[serde(deserialize_with = "de::list")]
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contributor {
    #[serde(alias = "name", alias = "login", deserialize_with = "de::text")]
    pub username: Option<String>,
    #[serde(deserialize_with = "de::count")]
    pub commits: Option<u64>,
    #[serde(deserialize_with = "de::number")]
    pub percentage: Option<f64>,
}

pub const MAX_CONTRIBUTORS: usize = 5;

/// Raw metrics for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawData {
    Architecture(ArchitectureData),
    Quality(QualityData),
    Principles(PrinciplesData),
    Collaboration(CollaborationData),
}

/// Decode a raw-data object, treating anything undecodable as empty. The
/// fallback view always renders, if only to say nothing was reported.
pub(crate) fn decode_or_default<T>(name: &str, value: Option<&Value>) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            tracing::warn!(section = name, error = %e, "raw data did not decode");
            T::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strong_signals_filter_and_cap() {
        let data: ArchitectureData = serde_json::from_value(json!({
            "primary_pattern": "Layered",
            "signals": [
                {"pattern": "Layered", "confidence": 88},
                {"pattern": "MVC", "confidence": 49.9},
                {"pattern": "Hexagonal", "confidence": "70"},
                {"name": "Event-driven", "confidence": 50},
                {"pattern": "Microkernel", "confidence": 95},
                {"confidence": 99}
            ]
        }))
        .unwrap();
        let names: Vec<_> = data
            .strong_signals()
            .iter()
            .map(|s| s.pattern.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["Layered", "Hexagonal", "Event-driven"]);
    }

    #[test]
    fn collaboration_contributors_accept_aliases() {
        let data: CollaborationData = serde_json::from_value(json!({
            "bus_factor": 2,
            "contributors": [{"login": "octocat", "commits": 12, "percentage": 60.0}, 5]
        }))
        .unwrap();
        assert_eq!(data.bus_factor, Some(2));
        assert_eq!(data.contributors.len(), 1);
        assert_eq!(data.contributors[0].username.as_deref(), Some("octocat"));
    }

    #[test]
    fn undecodable_raw_data_becomes_default() {
        let q: QualityData = decode_or_default("quality", Some(&json!({"scores": "n/a"})));
        assert_eq!(q, QualityData::default());
        let p: PrinciplesData = decode_or_default("principles", None);
        assert!(p.violations.is_empty());
    }
}
