//! fwopt - firewall policy optimizer
//!
//! An analysis engine for iptables firewall policies: it parses
//! iptables-save dumps, detects redundant, conflicting, shadowed and risky
//! rules, scores the policy, and generates an optimization plan whose
//! mechanical parts it can apply to a copy of the policy.
//!
//! # Architecture
//!
//! - [`core`] - Rule model, range algebra, issue detection, recommendations
//! - [`parser`] - iptables-save text to [`Policy`]
//! - [`report`] - Text/JSON report forms and policy diffs
//! - [`validators`] - Field-level validation of parsed rules
//!
//! # Analysis guarantees
//!
//! - Input policies are never mutated; the applier returns a new value
//! - Malformed field text degrades to conservative answers, never a panic
//! - Issue evidence keeps original dump line numbers for traceability

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod core;
pub mod parser;
pub mod report;
pub mod validators;

// Re-export commonly used types
pub use core::analyzer::{AnalysisResult, Issue, IssueType, Severity, Statistics, analyze};
pub use core::error::{Error, Result};
pub use core::recommender::{
    OptimizationPlan, Priority, Recommendation, RecommendationType, RiskLevel, apply_plan,
    recommend,
};
pub use core::rules::{Chain, ChainPolicy, Policy, Rule, RuleAction};
pub use parser::{parse_iptables_save, parse_rule};
