use serde::Serialize;

/// Letter grade for a 0-100 score.
pub fn grade(score: f64) -> &'static str {
    match score {
        s if s >= 95.0 => "A+",
        s if s >= 90.0 => "A",
        s if s >= 70.0 => "B",
        s if s >= 60.0 => "C",
        s if s >= 50.0 => "D",
        _ => "F",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HireVerdict {
    StrongYes,
    Yes,
    Maybe,
    StrongNo,
    No,
    Unclassified,
}

impl HireVerdict {
    pub fn label(self) -> &'static str {
        match self {
            HireVerdict::StrongYes => "Strong Yes",
            HireVerdict::Yes => "Yes",
            HireVerdict::Maybe => "Maybe",
            HireVerdict::StrongNo => "Strong No",
            HireVerdict::No => "No",
            HireVerdict::Unclassified => "Recommendation",
        }
    }
}

/// The service's free-text hire recommendation with its classified verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HireRecommendation {
    pub verdict: HireVerdict,
    pub text: String,
}

impl HireRecommendation {
    /// Classify by substring, checking "strong yes", "yes", "maybe",
    /// "strong no", "no" in that order. The text is kept verbatim.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        let verdict = [
            ("strong yes", HireVerdict::StrongYes),
            ("yes", HireVerdict::Yes),
            ("maybe", HireVerdict::Maybe),
            ("strong no", HireVerdict::StrongNo),
            ("no", HireVerdict::No),
        ]
        .into_iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or(HireVerdict::Unclassified, |(_, v)| v);
        Self {
            verdict,
            text: text.to_string(),
        }
    }
}
