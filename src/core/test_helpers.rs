//! Shared test utilities for core module tests
//!
//! Provides common test helpers to avoid duplication across test suites.
//! This module is only compiled in test mode.

use crate::core::rules::{AddressSpec, Policy, PortSpec, Rule};

/// Creates a bare rule in `filter`/`chain` with the given target.
///
/// The raw text is synthesized to match the populated fields, so checks
/// that look at `raw` (the missing-log heuristic) behave as they would on
/// parsed input.
pub fn create_test_rule(chain: &str, target: &str, line_number: usize) -> Rule {
    let raw = format!("-A {chain} -j {target}");
    Rule::new("filter", chain, target, line_number, raw)
}

/// Creates a TCP rule with optional source and destination port.
///
/// # Arguments
///
/// * `chain` - Chain name, always in the `filter` table
/// * `target` - Raw `-j` target (ACCEPT, DROP, ...)
/// * `line_number` - 1-based dump line number
/// * `source` - Optional source IP/CIDR as written in the rule
/// * `dport` - Optional destination port or `a:b` range
pub fn create_tcp_rule(
    chain: &str,
    target: &str,
    line_number: usize,
    source: Option<&str>,
    dport: Option<&str>,
) -> Rule {
    let mut raw = format!("-A {chain} -p tcp");
    if let Some(source) = source {
        raw.push_str(&format!(" -s {source}"));
    }
    if let Some(dport) = dport {
        raw.push_str(&format!(" --dport {dport}"));
    }
    raw.push_str(&format!(" -j {target}"));

    let mut rule = Rule::new("filter", chain, target, line_number, raw);
    rule.protocol = Some("tcp".to_string());
    rule.source = source.map(AddressSpec::new);
    rule.destination_port = dport.map(PortSpec::new);
    rule
}

/// Builds a policy from a list of rules, creating chain entries as needed.
/// Rule order within a chain follows list order.
pub fn create_test_policy(rules: Vec<Rule>) -> Policy {
    let mut policy = Policy::new();
    for rule in rules {
        let table = rule.table.clone();
        let chain = rule.chain.clone();
        policy.chain_entry(&table, &chain).rules.push(rule);
    }
    policy
}
