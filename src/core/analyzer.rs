//! Issue detection and scoring over a firewall policy
//!
//! Runs a fixed battery of checks over each chain's rule sequence and
//! reduces the findings to two scalar scores. Detection is pure, read-only
//! and per-chain: chains never interact, and a rule may carry several
//! issues at once.
//!
//! The checks are heuristic and pairwise, not a SAT/BDD-style decision
//! procedure over the full rule space. Chains are expected to be at most a
//! few hundred rules, so the O(n²) scans are acceptable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::range::{address_contains, address_overlaps, port_contains};
use crate::core::rules::{ADMIN_PORTS, Policy, Rule, RuleAction};

/// Kinds of defects the detector reports.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    #[strum(serialize = "redundant")]
    Redundant,
    #[strum(serialize = "conflicting")]
    Conflicting,
    #[strum(serialize = "unreachable")]
    Unreachable,
    #[strum(serialize = "inefficient_order")]
    InefficientOrder,
    #[strum(serialize = "security_risk")]
    SecurityRisk,
    #[strum(serialize = "overly_permissive")]
    OverlyPermissive,
    #[strum(serialize = "missing_log")]
    MissingLog,
}

/// Severity of an issue, ordered from least to most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[strum(serialize = "low")]
    Low,
    #[strum(serialize = "medium")]
    Medium,
    #[strum(serialize = "high")]
    High,
    #[strum(serialize = "critical")]
    Critical,
}

/// One defect found in the policy, with the offending rule(s) as evidence.
///
/// Evidence is ordered: when two rules are involved, the earlier-position
/// rule always comes first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    pub affected_rules: Vec<Rule>,
    pub recommendation: String,
    /// Reserved for probabilistic checks; currently always 1.0.
    pub confidence: f64,
}

impl Issue {
    fn new(
        issue_type: IssueType,
        severity: Severity,
        description: String,
        affected_rules: Vec<Rule>,
        recommendation: &str,
    ) -> Self {
        Self {
            issue_type,
            severity,
            description,
            affected_rules,
            recommendation: recommendation.to_string(),
            confidence: 1.0,
        }
    }
}

/// Whole-policy statistics, computed once and independent of issues.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub total_rules: usize,
    pub total_chains: usize,
    pub total_tables: usize,
    pub accept_rules: usize,
    pub drop_rules: usize,
    pub reject_rules: usize,
    pub custom_chains: usize,
}

/// Results of a full policy analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub statistics: Statistics,
    pub efficiency_score: f64,
    pub security_score: f64,
}

impl AnalysisResult {
    pub fn issues_by_type(&self, issue_type: IssueType) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.issue_type == issue_type)
            .collect()
    }

    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

/// Performs a comprehensive analysis of the policy.
///
/// An empty policy yields an empty issue list with both scores at 100:
/// there is nothing to penalize, and an empty input is not an error.
pub fn analyze(policy: &Policy) -> AnalysisResult {
    let mut issues = Vec::new();

    for (table, rule) in policy.unresolved_jumps() {
        tracing::warn!(
            table,
            line = rule.line_number,
            target = rule.action.to_string(),
            "jump target does not exist in table; not traversed"
        );
    }

    for (table, chains) in &policy.tables {
        for chain in chains.values() {
            if chain.rules.is_empty() {
                continue;
            }

            let before = issues.len();
            check_redundant(&chain.rules, &mut issues);
            check_conflicting(&chain.rules, &mut issues);
            check_ordering(&chain.rules, &mut issues);
            check_unreachable(&chain.rules, &mut issues);
            check_security(&chain.rules, &mut issues);
            check_permissive(&chain.rules, &mut issues);
            tracing::debug!(
                table,
                chain = chain.name,
                rules = chain.rules.len(),
                issues = issues.len() - before,
                "chain analyzed"
            );
        }
    }

    let statistics = statistics(policy);
    let efficiency_score = efficiency_score(&issues);
    let security_score = security_score(&issues);

    AnalysisResult {
        issues,
        statistics,
        efficiency_score,
        security_score,
    }
}

/// Flags every rule whose signature already appeared earlier in the chain.
/// The evidence always references the earliest occurrence first.
fn check_redundant(rules: &[Rule], issues: &mut Vec<Issue>) {
    let mut seen: HashMap<String, &Rule> = HashMap::new();

    for rule in rules {
        let signature = rule.signature();
        if let Some(original) = seen.get(signature.as_str()) {
            issues.push(Issue::new(
                IssueType::Redundant,
                Severity::Medium,
                format!(
                    "Redundant rule found: duplicate of rule at line {}",
                    original.line_number
                ),
                vec![(*original).clone(), rule.clone()],
                "Remove the duplicate rule to improve performance and reduce complexity",
            ));
        } else {
            seen.insert(signature, rule);
        }
    }
}

/// Flags every unordered pair of terminal rules with different targets
/// whose matching fields all overlap or are absent on at least one side.
fn check_conflicting(rules: &[Rule], issues: &mut Vec<Issue>) {
    for (i, a) in rules.iter().enumerate() {
        for b in &rules[i + 1..] {
            if !rules_conflict(a, b) {
                continue;
            }
            let severity = if a.action == RuleAction::Drop || b.action == RuleAction::Drop {
                Severity::High
            } else {
                Severity::Medium
            };
            issues.push(Issue::new(
                IssueType::Conflicting,
                severity,
                format!(
                    "Conflicting rules: {} vs {} for same traffic",
                    a.action, b.action
                ),
                vec![a.clone(), b.clone()],
                "Review rule order and consolidate conflicting rules",
            ));
        }
    }
}

/// Flags (general, specific) pairs where a strictly more general rule with
/// a different target precedes a more specific one, leaving the specific
/// rule needlessly after a catch-all.
fn check_ordering(rules: &[Rule], issues: &mut Vec<Issue>) {
    for (i, rule) in rules.iter().enumerate() {
        for earlier in &rules[..i] {
            if earlier.restriction_count() < rule.restriction_count()
                && earlier.action != rule.action
            {
                issues.push(Issue::new(
                    IssueType::InefficientOrder,
                    Severity::Medium,
                    format!(
                        "Specific rule at line {} comes after general rule at line {}",
                        rule.line_number, earlier.line_number
                    ),
                    vec![earlier.clone(), rule.clone()],
                    "Move more specific rules before general ones for better performance",
                ));
            }
        }
    }
}

/// Flags rules completely shadowed by an earlier terminal rule. Only the
/// nearest covering predecessor is reported; exact duplicates are left to
/// the redundancy check.
fn check_unreachable(rules: &[Rule], issues: &mut Vec<Issue>) {
    for (i, rule) in rules.iter().enumerate() {
        for earlier in &rules[..i] {
            if covers_completely(earlier, rule) && earlier.action.is_terminal() {
                if earlier.signature() == rule.signature() {
                    continue;
                }
                issues.push(Issue::new(
                    IssueType::Unreachable,
                    Severity::Medium,
                    format!(
                        "Rule at line {} is unreachable due to rule at line {}",
                        rule.line_number, earlier.line_number
                    ),
                    vec![earlier.clone(), rule.clone()],
                    "Remove unreachable rule or reorder rules",
                ));
                break;
            }
        }
    }
}

/// Flags accept rules exposing an administrative port to any source, and
/// drop rules whose text carries no logging marker.
fn check_security(rules: &[Rule], issues: &mut Vec<Issue>) {
    for rule in rules {
        if rule.action == RuleAction::Accept
            && rule.source_unrestricted()
            && let Some(port) = rule.destination_port.as_ref()
            && let Some(range) = port.range()
            && range.start == range.end
            && ADMIN_PORTS.contains(&range.start)
        {
            issues.push(Issue::new(
                IssueType::SecurityRisk,
                Severity::High,
                format!("Administrative port {port} open to all sources"),
                vec![rule.clone()],
                "Restrict access to administrative ports to specific source IPs",
            ));
        }

        if rule.action == RuleAction::Drop && !rule.raw.contains("LOG") {
            issues.push(Issue::new(
                IssueType::MissingLog,
                Severity::Low,
                "DROP rule without logging".to_string(),
                vec![rule.clone()],
                "Consider adding logging to DROP rules for security monitoring",
            ));
        }
    }
}

/// Flags accept rules with no protocol, source, destination or destination
/// port restriction at all.
fn check_permissive(rules: &[Rule], issues: &mut Vec<Issue>) {
    for rule in rules {
        if rule.action == RuleAction::Accept
            && rule.protocol.is_none()
            && rule.source.is_none()
            && rule.destination.is_none()
            && rule.destination_port.is_none()
        {
            issues.push(Issue::new(
                IssueType::OverlyPermissive,
                Severity::High,
                "Rule accepts all traffic without restrictions".to_string(),
                vec![rule.clone()],
                "Add specific restrictions to limit the scope of this rule",
            ));
        }
    }
}

/// Two rules conflict when both are terminal, their dispositions differ,
/// and every matching field either overlaps (addresses), is equal, or is
/// absent on at least one side.
fn rules_conflict(a: &Rule, b: &Rule) -> bool {
    if a.action == b.action || !a.action.is_terminal() || !b.action.is_terminal() {
        return false;
    }

    let fields_eq = |x: Option<&str>, y: Option<&str>| match (x, y) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    };

    let addrs_overlap = |x: Option<&crate::core::rules::AddressSpec>,
                         y: Option<&crate::core::rules::AddressSpec>| {
        match (x, y) {
            (Some(x), Some(y)) => x == y || address_overlaps(Some(x), Some(y)),
            _ => true,
        }
    };

    fields_eq(a.protocol.as_deref(), b.protocol.as_deref())
        && addrs_overlap(a.source.as_ref(), b.source.as_ref())
        && addrs_overlap(a.destination.as_ref(), b.destination.as_ref())
        && fields_eq(
            a.source_port.as_ref().map(|p| p.as_str()),
            b.source_port.as_ref().map(|p| p.as_str()),
        )
        && fields_eq(
            a.destination_port.as_ref().map(|p| p.as_str()),
            b.destination_port.as_ref().map(|p| p.as_str()),
        )
        && fields_eq(a.in_interface.as_deref(), b.in_interface.as_deref())
        && fields_eq(a.out_interface.as_deref(), b.out_interface.as_deref())
}

/// True when `general` would match all traffic `specific` would match:
/// every field of `general` is absent or contains the corresponding field
/// of `specific` (addresses and ports by interval containment, the rest by
/// equality).
fn covers_completely(general: &Rule, specific: &Rule) -> bool {
    let eq_or_any = |g: Option<&str>, s: Option<&str>| match g {
        None => true,
        Some(g) => s == Some(g),
    };

    eq_or_any(general.protocol.as_deref(), specific.protocol.as_deref())
        && address_contains(general.source.as_ref(), specific.source.as_ref())
        && address_contains(general.destination.as_ref(), specific.destination.as_ref())
        && port_contains(general.source_port.as_ref(), specific.source_port.as_ref())
        && port_contains(
            general.destination_port.as_ref(),
            specific.destination_port.as_ref(),
        )
        && eq_or_any(
            general.in_interface.as_deref(),
            specific.in_interface.as_deref(),
        )
        && eq_or_any(
            general.out_interface.as_deref(),
            specific.out_interface.as_deref(),
        )
}

fn statistics(policy: &Policy) -> Statistics {
    let mut stats = Statistics {
        total_tables: policy.tables.len(),
        ..Statistics::default()
    };

    for chains in policy.tables.values() {
        stats.total_chains += chains.len();
        for (name, chain) in chains {
            stats.total_rules += chain.rules.len();
            if !crate::core::rules::Chain::is_builtin_name(name) {
                stats.custom_chains += 1;
            }
            for rule in &chain.rules {
                match rule.action {
                    RuleAction::Accept => stats.accept_rules += 1,
                    RuleAction::Drop => stats.drop_rules += 1,
                    RuleAction::Reject => stats.reject_rules += 1,
                    _ => {}
                }
            }
        }
    }

    stats
}

/// Efficiency starts at 100 and loses a fixed penalty per structural issue.
fn efficiency_score(issues: &[Issue]) -> f64 {
    let mut score: f64 = 100.0;
    for issue in issues {
        score -= match issue.issue_type {
            IssueType::Redundant => 5.0,
            IssueType::InefficientOrder => 3.0,
            IssueType::Unreachable => 4.0,
            _ => 0.0,
        };
    }
    score.clamp(0.0, 100.0)
}

/// Security starts at 100 and loses a severity-scaled penalty per security
/// risk and a fixed penalty per overly permissive rule.
fn security_score(issues: &[Issue]) -> f64 {
    let mut score: f64 = 100.0;
    for issue in issues {
        score -= match issue.issue_type {
            IssueType::SecurityRisk => match issue.severity {
                Severity::Critical => 20.0,
                Severity::High => 15.0,
                Severity::Medium => 10.0,
                Severity::Low => 0.0,
            },
            IssueType::OverlyPermissive => 8.0,
            _ => 0.0,
        };
    }
    score.clamp(0.0, 100.0)
}
