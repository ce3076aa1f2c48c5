//! Plain-text report view.

use crate::assemble::{ReportBundle, Section, SectionContent};
use crate::insight::{
    ArchitectureInsight, CollaborationInsight, Finding, Insight, PrinciplesInsight, QualityInsight,
};
use crate::raw::{
    ArchitectureData, CollaborationData, PrinciplesData, QualityData, RawData, MAX_CONTRIBUTORS,
    MAX_VIOLATIONS,
};
use crate::score::grade;
use std::fmt::Write;

const FALLBACK_NOTICE: &str = "AI insights are still being generated. Showing raw analysis data.";
const NOTHING_REPORTED: &str = "No metrics reported for this section.";

/// Render the whole bundle as text.
pub fn render_text(bundle: &ReportBundle) -> String {
    let mut out = String::new();
    render_header(bundle, &mut out);
    for section in &bundle.sections {
        out.push('\n');
        render_section(section, &mut out);
    }
    render_footer(bundle, &mut out);
    out
}

fn render_header(bundle: &ReportBundle, out: &mut String) {
    let title = bundle
        .repository_url
        .as_deref()
        .map(repolens_core::RepoRef::label_for)
        .unwrap_or_else(|| format!("analysis {}", bundle.job_id));
    let _ = writeln!(out, "Report: {title}");
    if let Some(repo) = &bundle.repository {
        let mut facts = Vec::new();
        if let Some(lang) = &repo.primary_language {
            facts.push(lang.clone());
        }
        if let Some(stars) = repo.stars {
            facts.push(format!("{stars} stars"));
        }
        if let Some(forks) = repo.forks {
            facts.push(format!("{forks} forks"));
        }
        if !facts.is_empty() {
            let _ = writeln!(out, "  {}", facts.join(" | "));
        }
    }

    match (bundle.score.overall, bundle.score.grade) {
        (Some(score), Some(g)) => {
            let _ = writeln!(out, "Overall score: {score:.1}/100 ({g})");
        }
        _ => {
            let _ = writeln!(out, "Overall score: not reported");
        }
    }
    for section in &bundle.sections {
        let _ = writeln!(
            out,
            "  {:<18} {}",
            section.dimension.title(),
            format_score(section.score)
        );
    }

    let ready = bundle.enriched_count();
    let total = bundle.sections.len();
    let _ = writeln!(out, "{ready} of {total} AI sections ready");
    if !bundle.is_fully_enriched() {
        let _ = writeln!(
            out,
            "  Remaining sections show raw data while enrichment continues."
        );
    }

    if let Some(hire) = &bundle.hire_recommendation {
        let _ = writeln!(out, "\nHire recommendation: {}", hire.verdict.label());
        if !hire.text.eq_ignore_ascii_case(hire.verdict.label()) {
            let _ = writeln!(out, "  {}", hire.text);
        }
    }
    if let Some(summary) = &bundle.executive_summary {
        let _ = writeln!(out, "\nExecutive summary\n  {summary}");
    }
}

fn render_footer(bundle: &ReportBundle, out: &mut String) {
    if !bundle.learning_path.is_empty() {
        let _ = writeln!(out, "\nLearning path");
        for (i, step) in bundle.learning_path.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step.summary());
        }
    }
    if let Some(usage) = &bundle.ai_usage {
        let mut parts = Vec::new();
        if let Some(tokens) = usage.total_tokens {
            parts.push(format!("{tokens} tokens"));
        }
        if let Some(ms) = usage.processing_time_ms {
            parts.push(format!("{:.1}s", ms as f64 / 1000.0));
        }
        let _ = writeln!(out, "\nAI processing: {}", parts.join(", "));
    }
}

fn render_section(section: &Section, out: &mut String) {
    let _ = writeln!(
        out,
        "== {} ({}) ==",
        section.dimension.title(),
        format_score(section.score)
    );
    match &section.content {
        SectionContent::Enriched(insight) => render_insight(insight, out),
        SectionContent::Fallback(raw) => {
            let _ = writeln!(out, "{FALLBACK_NOTICE}");
            render_fallback(raw, out);
        }
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:.1} {}", grade(s)),
        None => "not reported".to_string(),
    }
}

fn format_number(n: Option<f64>) -> String {
    n.map_or_else(|| "N/A".to_string(), |n| format!("{n:.1}"))
}

fn list(out: &mut String, heading: &str, items: &[Finding]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for item in items {
        let _ = writeln!(out, "  - {}", item.summary());
    }
}

fn line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        let _ = writeln!(out, "{label}: {v}");
    }
}

// ── Enriched ──

fn render_insight(insight: &Insight, out: &mut String) {
    match insight {
        Insight::Architecture(a) => render_architecture_insight(a, out),
        Insight::Quality(q) => render_quality_insight(q, out),
        Insight::Principles(p) => render_principles_insight(p, out),
        Insight::Collaboration(c) => render_collaboration_insight(c, out),
    }
}

fn render_architecture_insight(a: &ArchitectureInsight, out: &mut String) {
    if let Some(j) = &a.pattern_justification {
        line(out, "Primary pattern", j.primary_pattern.as_deref());
        line(out, "Why", j.confidence_explanation.as_deref());
        list(out, "Evidence", &j.evidence_analysis);
        list(out, "Alternatives considered", &j.alternative_patterns_considered);
    }
    if let Some(q) = &a.quality_assessment {
        line(out, "Rating", q.overall_rating.as_deref());
        if let Some(score) = q.layering_score {
            let _ = writeln!(out, "Layering: {score:.1}");
        }
        list(out, "Strengths", &q.key_strengths);
        list(out, "Weaknesses", &q.key_weaknesses);
    }
    list(out, "Recommendations", &a.recommendations);
}

fn render_quality_insight(q: &QualityInsight, out: &mut String) {
    list(out, "Strengths", &q.key_strengths);
    list(out, "Critical issues", &q.critical_issues);
    list(out, "Quick wins", &q.quick_wins);
    if let Some(m) = &q.maintainability_score {
        if let Some(score) = m.score {
            let _ = writeln!(out, "Maintainability: {score:.1}");
        }
        if let Some(hours) = m.technical_debt_hours {
            let _ = writeln!(out, "Technical debt: {hours:.0} hours");
        }
        line(out, "Long-term cost", m.long_term_cost.as_deref());
        list(out, "Refactoring priorities", &m.refactoring_priorities);
    }
    if let Some(c) = &q.complexity_analysis {
        line(out, "Complexity", c.overall_assessment.as_deref());
        list(out, "Hotspots", &c.hotspots);
    }
}

fn render_principles_insight(p: &PrinciplesInsight, out: &mut String) {
    if let Some(solid) = &p.solid_principles_analysis {
        line(out, "SOLID adherence", solid.overall_adherence.as_deref());
        if let Some(srp) = &solid.single_responsibility {
            let _ = writeln!(
                out,
                "Single responsibility: {} ({} violations)",
                format_number(srp.score),
                srp.violations_found.as_deref().unwrap_or("?")
            );
            line(out, "  Impact", srp.impact.as_deref());
        }
        if let Some(dry) = &solid.dry_principle {
            let _ = writeln!(out, "DRY: {}", format_number(dry.score));
            line(out, "  Duplication", dry.duplication_level.as_deref());
            line(out, "  Estimated waste", dry.estimated_waste.as_deref());
        }
    }
    if let Some(org) = &p.code_organization {
        line(out, "Structure", org.structure_quality.as_deref());
        if let Some(score) = org.modularity_score {
            let _ = writeln!(out, "Modularity: {score:.1}");
        }
        list(out, "Improvements", &org.improvements);
    }
    if !p.actionable_roadmap.is_empty() {
        let _ = writeln!(out, "Roadmap:");
        for step in &p.actionable_roadmap {
            let _ = writeln!(
                out,
                "  {} [{}]",
                step.phase.as_deref().unwrap_or("Step"),
                step.effort_estimate.as_deref().unwrap_or("effort unknown")
            );
            for action in &step.actions {
                let _ = writeln!(out, "    - {}", action.summary());
            }
            if let Some(impact) = &step.expected_impact {
                let _ = writeln!(out, "    => {impact}");
            }
        }
    }
}

fn render_collaboration_insight(c: &CollaborationInsight, out: &mut String) {
    if let Some(b) = &c.collaboration_score_breakdown {
        if let Some(score) = b.current_score {
            let _ = writeln!(out, "Current score: {score:.1}");
        }
        list(out, "Raising the score", &b.factors_raising_score);
        list(out, "Lowering the score", &b.factors_lowering_score);
        line(out, "Realistic target", b.realistic_improvement_target.as_deref());
    }
    if let Some(t) = &c.team_dynamics {
        line(out, "Team health", t.collaboration_health.as_deref());
        list(out, "Observations", &t.key_observations);
        list(out, "Concerns", &t.potential_concerns);
    }
    if let Some(k) = &c.knowledge_distribution {
        line(out, "Bus factor risk", k.bus_factor_risk.as_deref());
        list(out, "Knowledge silos", &k.knowledge_silos);
        list(out, "Critical areas", &k.critical_areas);
    }
    list(out, "Recommendations", &c.team_health_recommendations);
}

// ── Fallback ──

/// Render raw metrics for one dimension.
pub fn render_fallback(raw: &RawData, out: &mut String) {
    let before = out.len();
    match raw {
        RawData::Architecture(a) => architecture_fallback(a, out),
        RawData::Quality(q) => quality_fallback(q, out),
        RawData::Principles(p) => principles_fallback(p, out),
        RawData::Collaboration(c) => collaboration_fallback(c, out),
    }
    if out.len() == before {
        let _ = writeln!(out, "{NOTHING_REPORTED}");
    }
}

fn architecture_fallback(a: &ArchitectureData, out: &mut String) {
    line(out, "Primary pattern", a.primary_pattern.as_deref());
    let signals = a.strong_signals();
    if !signals.is_empty() {
        let _ = writeln!(out, "Detected patterns:");
        for s in signals {
            let _ = writeln!(
                out,
                "  - {} ({:.0}%{})",
                s.pattern.as_deref().unwrap_or_default(),
                s.confidence.unwrap_or_default(),
                s.confidence_level
                    .as_deref()
                    .map(|l| format!(", {l}"))
                    .unwrap_or_default()
            );
        }
    }
}

fn quality_fallback(q: &QualityData, out: &mut String) {
    if let Some(s) = &q.scores {
        let _ = writeln!(
            out,
            "Overall {} | Complexity {} | Tests {} | Documentation {}",
            format_number(s.overall),
            format_number(s.complexity),
            format_number(s.tests),
            format_number(s.documentation)
        );
    }
    list(out, "Strengths", &q.strengths);
    list(out, "Issues", &q.issues);
    if let Some(f) = &q.file_metrics {
        let count = |n: Option<u64>| n.map_or_else(|| "N/A".to_string(), |n| n.to_string());
        let _ = writeln!(
            out,
            "Files {} | Lines {} | Avg length {} | Max length {}",
            count(f.total_files),
            count(f.total_lines),
            format_number(f.avg_file_length),
            count(f.max_file_length)
        );
    }
}

fn principles_fallback(p: &PrinciplesData, out: &mut String) {
    if let Some(score) = p.principle_score {
        let _ = write!(out, "Principle score: {score:.1}/100");
        match &p.grade {
            Some(g) => {
                let _ = writeln!(out, " (grade {g})");
            }
            None => out.push('\n'),
        }
    }
    if !p.violations.is_empty() {
        let _ = writeln!(out, "Violations ({}):", p.violations.len());
        for v in p.violations.iter().take(MAX_VIOLATIONS) {
            let _ = writeln!(
                out,
                "  - {}: {}",
                v.principle.as_deref().unwrap_or("Violation"),
                v.description.as_deref().unwrap_or("")
            );
            let _ = writeln!(
                out,
                "    severity {} | {}",
                v.severity.as_deref().unwrap_or("unknown"),
                v.file_path.as_deref().unwrap_or("-")
            );
        }
    }
}

fn collaboration_fallback(c: &CollaborationData, out: &mut String) {
    let mut metrics = Vec::new();
    if let Some(b) = c.bus_factor {
        metrics.push(format!("Bus factor {b}"));
    }
    if let Some(n) = c.active_contributors_count {
        metrics.push(format!("Active contributors {n}"));
    }
    if let Some(s) = c.collaboration_score {
        metrics.push(format!("Score {s:.1}"));
    }
    if !metrics.is_empty() {
        let _ = writeln!(out, "{}", metrics.join(" | "));
    }
    if !c.contributors.is_empty() {
        let _ = writeln!(out, "Top contributors:");
        for person in c.contributors.iter().take(MAX_CONTRIBUTORS) {
            let _ = writeln!(
                out,
                "  - {}: {} commits ({}%)",
                person.username.as_deref().unwrap_or("unknown"),
                person.commits.map_or_else(|| "?".to_string(), |n| n.to_string()),
                person.percentage.map_or_else(|| "?".to_string(), |p| format!("{p:.1}"))
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_payload;
    use serde_json::json;

    fn bundle(value: serde_json::Value) -> ReportBundle {
        assemble_payload("1", serde_json::from_value(value).unwrap())
    }

    #[test]
    fn mixed_report_renders_every_section_once() {
        let b = bundle(json!({
            "id": 1,
            "repository_url": "https://github.com/octocat/Hello-World",
            "overall_score": 91.2,
            "insights": {
                "quality": {"critical_issues": [{"issue": "No tests", "description": "0% coverage"}]},
                "collaboration": {"team_dynamics": {"collaboration_health": "healthy"}}
            },
            "principles_data": {"principle_score": 61, "violations": [
                {"principle": "SRP", "description": "God object", "severity": "high", "file_path": "src/app.py"}
            ]}
        }));
        let text = render_text(&b);

        assert!(text.starts_with("Report: octocat/Hello-World"));
        assert!(text.contains("Overall score: 91.2/100 (A)"));
        assert!(text.contains("2 of 4 AI sections ready"));
        assert!(text.contains("Remaining sections show raw data"));
        for title in ["Architecture", "Code Quality", "Design Principles", "Collaboration"] {
            assert_eq!(text.matches(&format!("== {title} (")).count(), 1, "{title}");
        }
        assert_eq!(text.matches(FALLBACK_NOTICE).count(), 2);
        assert!(text.contains("No tests: 0% coverage"));
        assert!(text.contains("severity high | src/app.py"));
        assert!(text.contains("Team health: healthy"));
    }

    #[test]
    fn empty_fallback_says_so() {
        let mut out = String::new();
        render_fallback(&RawData::Collaboration(CollaborationData::default()), &mut out);
        assert_eq!(out.trim(), NOTHING_REPORTED);
    }

    #[test]
    fn absent_overall_score_is_not_reported() {
        let text = render_text(&bundle(json!({"id": 1})));
        assert!(text.contains("Overall score: not reported"));
        assert!(text.contains("0 of 4 AI sections ready"));
    }

    #[test]
    fn quality_fallback_marks_missing_scores() {
        let mut out = String::new();
        let q: QualityData = serde_json::from_value(json!({
            "scores": {"overall": 70.5, "tests": 40},
            "file_metrics": {"total_files": 12}
        }))
        .unwrap();
        render_fallback(&RawData::Quality(q), &mut out);
        assert!(out.contains("Overall 70.5 | Complexity N/A | Tests 40.0 | Documentation N/A"));
        assert!(out.contains("Files 12 | Lines N/A"));
    }

    #[test]
    fn collaboration_fallback_caps_contributors() {
        let people: Vec<_> = (0..8)
            .map(|i| json!({"username": format!("dev{i}"), "commits": 10 - i, "percentage": 10.0}))
            .collect();
        let c: CollaborationData =
            serde_json::from_value(json!({"bus_factor": 2, "contributors": people})).unwrap();
        let mut out = String::new();
        render_fallback(&RawData::Collaboration(c), &mut out);
        assert!(out.contains("Bus factor 2"));
        assert!(out.contains("dev4"));
        assert!(!out.contains("dev5"));
    }

    #[test]
    fn hire_recommendation_shows_verdict_and_text() {
        let text = render_text(&bundle(json!({
            "id": 1,
            "ai_hire_recommendation": "Strong yes: ships clean code"
        })));
        assert!(text.contains("Hire recommendation: Strong Yes"));
        assert!(text.contains("Strong yes: ships clean code"));
    }
}
