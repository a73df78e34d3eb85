//! Core policy analysis functionality
//!
//! This module contains the core types and logic for analyzing iptables
//! firewall policies. It provides:
//!
//! - [`rules`]: Data structures for representing rules, chains and policies
//! - [`range`]: Address and port overlap/containment predicates
//! - [`analyzer`]: Issue detection and policy scoring
//! - [`recommender`]: Recommendation generation and plan application
//! - [`error`]: Error types for analysis operations

pub mod analyzer;
pub mod error;
pub mod range;
pub mod recommender;
pub mod rules;

#[cfg(test)]
pub mod test_helpers;
