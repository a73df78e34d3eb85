//! Report rendering
//!
//! Plain-data output forms for analysis results and optimization plans: a
//! human-readable text summary, hierarchical JSON documents, and a unified
//! diff between two policies. Callers own presentation beyond that.

use serde_json::{Value, json};
use similar::TextDiff;
use strum::IntoEnumIterator;

use crate::core::analyzer::{AnalysisResult, Issue, IssueType};
use crate::core::error::Result;
use crate::core::recommender::{OptimizationPlan, Priority, Recommendation};
use crate::core::rules::Policy;

/// Renders an analysis as text, one issue record per line, with a score
/// footer. Affected rules are reported by their 1-based dump line numbers.
pub fn analysis_to_text(analysis: &AnalysisResult) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for issue in &analysis.issues {
        let _ = writeln!(
            out,
            "{} [{}] lines {}: {} ({})",
            issue.issue_type,
            issue.severity,
            line_list(issue),
            issue.description,
            issue.recommendation
        );
    }
    let _ = writeln!(
        out,
        "efficiency score: {:.0}, security score: {:.0}, issues: {}",
        analysis.efficiency_score,
        analysis.security_score,
        analysis.issues.len()
    );
    out
}

/// Renders an analysis as a hierarchical JSON document: scores, statistics,
/// and the issues grouped by type. Types with no findings are omitted.
pub fn analysis_document(analysis: &AnalysisResult) -> Value {
    let mut issues = serde_json::Map::new();
    for issue_type in IssueType::iter() {
        let found = analysis.issues_by_type(issue_type);
        if found.is_empty() {
            continue;
        }
        let entries: Vec<Value> = found.into_iter().map(issue_entry).collect();
        issues.insert(issue_type.to_string(), Value::Array(entries));
    }

    json!({
        "efficiency_score": analysis.efficiency_score,
        "security_score": analysis.security_score,
        "statistics": analysis.statistics,
        "issues": issues,
    })
}

/// Renders a plan as JSON with the recommendations grouped by priority
/// tier (most urgent tier first) and the savings summary.
pub fn plan_document(plan: &OptimizationPlan) -> Value {
    let mut tiers = serde_json::Map::new();
    for priority in Priority::iter().rev() {
        let in_tier = plan.by_priority(priority);
        if in_tier.is_empty() {
            continue;
        }
        let entries: Vec<Value> = in_tier.into_iter().map(recommendation_entry).collect();
        tiers.insert(priority.to_string(), Value::Array(entries));
    }

    json!({
        "recommendations": tiers,
        "total_recommendations": plan.recommendations.len(),
        "estimated_savings": plan.estimated_savings,
    })
}

/// Serializes the analysis document to pretty-printed JSON.
pub fn analysis_json(analysis: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&analysis_document(analysis))?)
}

/// Serializes the plan document to pretty-printed JSON.
pub fn plan_json(plan: &OptimizationPlan) -> Result<String> {
    Ok(serde_json::to_string_pretty(&plan_document(plan))?)
}

/// Unified diff between two policies' save-format renderings. Handy for
/// showing what `apply_plan` would change before anything is committed.
pub fn diff_policies(before: &Policy, after: &Policy) -> String {
    let old = before.to_save_format();
    let new = after.to_save_format();
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header("current", "optimized")
        .to_string()
}

fn line_list(issue: &Issue) -> String {
    let lines: Vec<String> = issue
        .affected_rules
        .iter()
        .map(|r| r.line_number.to_string())
        .collect();
    lines.join(", ")
}

fn issue_entry(issue: &Issue) -> Value {
    let lines: Vec<usize> = issue.affected_rules.iter().map(|r| r.line_number).collect();
    json!({
        "severity": issue.severity,
        "description": issue.description,
        "recommendation": issue.recommendation,
        "affected_rules": lines,
        "confidence": issue.confidence,
    })
}

fn recommendation_entry(rec: &Recommendation) -> Value {
    let affected: Vec<usize> = rec.affected_rules.iter().map(|r| r.line_number).collect();
    let new_rules: Vec<&str> = rec.new_rules.iter().map(|r| r.raw.as_str()).collect();
    json!({
        "type": rec.rec_type,
        "title": rec.title,
        "description": rec.description,
        "risk_level": rec.risk_level,
        "estimated_impact": rec.estimated_impact,
        "implementation_notes": rec.implementation_notes,
        "affected_rules": affected,
        "new_rules": new_rules,
    })
}
