//! Firewall policy data structures
//!
//! This module defines the normalized representation of a single filtering
//! rule and of a full policy (ordered per-chain rule sequences grouped by
//! table), as produced by the [`crate::parser`] and consumed by the
//! analyzer, recommender and plan applier.
//!
//! # Rule structure
//!
//! A [`Rule`] carries the matching fields the detectors reason about
//! (protocol, source/destination address and port, interfaces, connection
//! state), the resolved [`RuleAction`], an opaque parameter map for
//! everything else, and the original rule text. The text is preserved
//! verbatim so a policy can be written back out without rewriting any
//! surviving rule.
//!
//! # Example
//!
//! ```
//! use fwopt::core::rules::{Rule, RuleAction};
//!
//! let rule = Rule::new("filter", "INPUT", "ACCEPT", 1, "-A INPUT -p tcp --dport 22 -j ACCEPT");
//! assert_eq!(rule.action, RuleAction::Accept);
//! assert!(rule.action.is_terminal());
//! ```

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// The five chains built into the filter/nat/mangle tables; anything else
/// declared in a dump is a user-defined chain.
pub const BUILTIN_CHAINS: [&str; 5] = ["INPUT", "OUTPUT", "FORWARD", "PREROUTING", "POSTROUTING"];

/// Destination ports whose exposure to any source is flagged as a security
/// risk (SSH, Telnet, RDP).
pub const ADMIN_PORTS: [u16; 3] = [22, 23, 3389];

/// Disposition of a rule when it matches, resolved from the raw `-j` target
/// at construction time.
///
/// Modeled as an explicit sum type so detectors branch on variants instead
/// of comparing target strings ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
pub enum RuleAction {
    #[strum(serialize = "ACCEPT")]
    Accept,
    #[strum(serialize = "DROP")]
    Drop,
    #[strum(serialize = "REJECT")]
    Reject,
    #[strum(serialize = "LOG")]
    Log,
    #[strum(serialize = "RETURN")]
    Return,
    /// Jump to a user-defined chain; the payload is the chain name.
    #[strum(to_string = "{0}")]
    Jump(String),
}

impl RuleAction {
    /// Resolves a raw target token into an action variant. Anything that is
    /// not one of the five built-in targets is a jump to a chain.
    pub fn from_target(target: &str) -> Self {
        match target {
            "ACCEPT" => RuleAction::Accept,
            "DROP" => RuleAction::Drop,
            "REJECT" => RuleAction::Reject,
            "LOG" => RuleAction::Log,
            "RETURN" => RuleAction::Return,
            other => RuleAction::Jump(other.to_string()),
        }
    }

    /// True for the targets that end evaluation for a matching packet.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RuleAction::Accept | RuleAction::Drop | RuleAction::Reject
        )
    }

    /// The jump target chain name, if this action is a jump.
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            RuleAction::Jump(chain) => Some(chain.as_str()),
            _ => None,
        }
    }
}

/// An address specification as written in the rule: a single host, a CIDR
/// network, or (when absent on the rule) "any".
///
/// The raw text is kept as-is; parsing happens lazily in the range algebra
/// so that malformed specifications degrade to conservative answers instead
/// of aborting analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AddressSpec(pub String);

impl AddressSpec {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the specification into a network. A bare host address parses
    /// as a /32 (or /128) network. Returns `None` for malformed text.
    pub fn network(&self) -> Option<IpNetwork> {
        self.0.parse().ok()
    }

    /// True when the specification places no real restriction on the
    /// address (explicit any-network notations).
    pub fn is_unrestricted(&self) -> bool {
        matches!(self.0.as_str(), "0.0.0.0/0" | "::/0") || self.0.eq_ignore_ascii_case("any")
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inclusive port interval; a single port is the degenerate interval
/// `[p, p]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// A port specification as written in the rule: a single port or an
/// inclusive range in `start:end` (iptables) or `start-end` notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PortSpec(pub String);

impl PortSpec {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the specification into an inclusive interval. Returns `None`
    /// for malformed text (callers fall back to string comparison).
    pub fn range(&self) -> Option<PortRange> {
        let (start, end) = match self.0.split_once(':').or_else(|| self.0.split_once('-')) {
            Some((a, b)) => (a.parse().ok()?, b.parse().ok()?),
            None => {
                let p = self.0.parse().ok()?;
                (p, p)
            }
        };
        Some(PortRange { start, end })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single filtering rule in normalized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    /// Stable identity used by the plan applier to delete this exact rule.
    pub id: Uuid,
    pub table: String,
    pub chain: String,
    pub action: RuleAction,
    pub protocol: Option<String>,
    pub source: Option<AddressSpec>,
    pub destination: Option<AddressSpec>,
    pub source_port: Option<PortSpec>,
    pub destination_port: Option<PortSpec>,
    pub in_interface: Option<String>,
    pub out_interface: Option<String>,
    /// Connection-state token (`--ctstate` value), e.g. `ESTABLISHED,RELATED`.
    pub state: Option<String>,
    /// Free-form parameters not explicitly modeled (`-m`, `--log-prefix`, …).
    /// Flag-only parameters map to `true`, valued ones to their string.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// 1-based position of the rule within its source text.
    pub line_number: usize,
    /// Original textual form, preserved verbatim for round-tripping and
    /// user-facing evidence.
    pub raw: String,
}

impl Rule {
    /// Creates a rule with only the structural fields populated. Matching
    /// fields start absent ("any"); the parser fills them in.
    pub fn new(
        table: impl Into<String>,
        chain: impl Into<String>,
        target: &str,
        line_number: usize,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            table: table.into(),
            chain: chain.into(),
            action: RuleAction::from_target(target),
            protocol: None,
            source: None,
            destination: None,
            source_port: None,
            destination_port: None,
            in_interface: None,
            out_interface: None,
            state: None,
            parameters: BTreeMap::new(),
            line_number,
            raw: raw.into(),
        }
    }

    /// Number of populated matching fields among protocol, source,
    /// destination, source-port and destination-port. Used as a generality
    /// proxy: fewer restrictions means a more general rule.
    pub fn restriction_count(&self) -> usize {
        usize::from(self.protocol.is_some())
            + usize::from(self.source.is_some())
            + usize::from(self.destination.is_some())
            + usize::from(self.source_port.is_some())
            + usize::from(self.destination_port.is_some())
    }

    /// Duplicate-detection signature over every matching field. Two rules
    /// with equal signatures match exactly the same traffic with the same
    /// disposition.
    pub fn signature(&self) -> String {
        fn opt(v: Option<&str>) -> &str {
            v.unwrap_or("")
        }
        let action = self.action.to_string();
        [
            self.chain.as_str(),
            action.as_str(),
            opt(self.protocol.as_deref()),
            opt(self.source.as_ref().map(AddressSpec::as_str)),
            opt(self.destination.as_ref().map(AddressSpec::as_str)),
            opt(self.source_port.as_ref().map(PortSpec::as_str)),
            opt(self.destination_port.as_ref().map(PortSpec::as_str)),
            opt(self.in_interface.as_deref()),
            opt(self.out_interface.as_deref()),
            opt(self.state.as_deref()),
        ]
        .join("|")
    }

    /// True when the source is absent or an explicit any-network, i.e. the
    /// rule applies to traffic from anywhere.
    pub fn source_unrestricted(&self) -> bool {
        self.source.as_ref().is_none_or(AddressSpec::is_unrestricted)
    }
}

/// Default policy of a chain.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum ChainPolicy {
    #[default]
    #[strum(serialize = "ACCEPT")]
    Accept,
    #[strum(serialize = "DROP")]
    Drop,
    #[strum(serialize = "REJECT")]
    Reject,
}

/// A named chain: its default policy, observed counters, and the ordered
/// rule sequence it owns. Order is semantically significant: evaluation is
/// first-match-wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chain {
    pub name: String,
    pub policy: ChainPolicy,
    pub packet_count: u64,
    pub byte_count: u64,
    pub user_defined: bool,
    pub rules: Vec<Rule>,
}

impl Chain {
    pub fn new(name: impl Into<String>, policy: ChainPolicy, user_defined: bool) -> Self {
        Self {
            name: name.into(),
            policy,
            packet_count: 0,
            byte_count: 0,
            user_defined,
            rules: Vec::new(),
        }
    }

    /// Whether the chain name is one of the five built-in chains.
    pub fn is_builtin_name(name: &str) -> bool {
        BUILTIN_CHAINS.contains(&name)
    }
}

/// A complete firewall policy: table name → chain name → chain, plus the
/// free-text comment lines of the source dump.
///
/// Policies are immutable inputs to detection; the only component producing
/// a new policy value is the plan applier, which operates on its own clone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    pub tables: BTreeMap<String, BTreeMap<String, Chain>>,
    pub comments: Vec<String>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a chain, creating the table and chain entries if absent.
    /// New chains default to an ACCEPT policy and are marked user-defined
    /// unless the name is a built-in one.
    pub fn chain_entry(&mut self, table: &str, chain: &str) -> &mut Chain {
        self.tables
            .entry(table.to_string())
            .or_default()
            .entry(chain.to_string())
            .or_insert_with(|| {
                Chain::new(chain, ChainPolicy::Accept, !Chain::is_builtin_name(chain))
            })
    }

    pub fn chain(&self, table: &str, chain: &str) -> Option<&Chain> {
        self.tables.get(table)?.get(chain)
    }

    /// Total number of rules across all tables and chains.
    pub fn rule_count(&self) -> usize {
        self.tables
            .values()
            .flat_map(BTreeMap::values)
            .map(|c| c.rules.len())
            .sum()
    }

    /// Iterates every rule in the policy, table by table, chain by chain.
    pub fn all_rules(&self) -> impl Iterator<Item = &Rule> {
        self.tables
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(|c| c.rules.iter())
    }

    /// Jump targets that do not resolve to a chain in the same table.
    ///
    /// Not fatal: unresolved jumps are simply never traversed by the
    /// dependency view, but they are worth surfacing to the caller.
    pub fn unresolved_jumps(&self) -> Vec<(&str, &Rule)> {
        let mut missing = Vec::new();
        for (table, chains) in &self.tables {
            for chain in chains.values() {
                for rule in &chain.rules {
                    if let Some(target) = rule.action.jump_target()
                        && !chains.contains_key(target)
                    {
                        missing.push((table.as_str(), rule));
                    }
                }
            }
        }
        missing
    }

    /// Writes the policy back out in iptables-save format.
    ///
    /// Round-trip contract: every surviving rule's original text is emitted
    /// verbatim and per-chain order is preserved. Only whole rules are ever
    /// added or removed; rule text is never rewritten.
    pub fn to_save_format(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        for comment in &self.comments {
            let _ = writeln!(out, "{comment}");
        }
        for (table, chains) in &self.tables {
            let _ = writeln!(out, "*{table}");
            for chain in chains.values() {
                if chain.user_defined {
                    let _ = writeln!(
                        out,
                        ":{} - [{}:{}]",
                        chain.name, chain.packet_count, chain.byte_count
                    );
                } else {
                    let _ = writeln!(
                        out,
                        ":{} {} [{}:{}]",
                        chain.name, chain.policy, chain.packet_count, chain.byte_count
                    );
                }
            }
            for chain in chains.values() {
                for rule in &chain.rules {
                    let _ = writeln!(out, "{}", rule.raw);
                }
            }
            let _ = writeln!(out, "COMMIT");
        }
        out
    }
}
