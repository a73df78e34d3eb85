//! iptables-save format parsing
//!
//! Fail-soft: a malformed line is logged and skipped, never fatal, so one
//! bad rule cannot take down analysis of the rest of the dump. Line numbers
//! are 1-based positions in the input text, counting every line, so issue
//! evidence maps back to the original dump unchanged.

use logos::Logos;

use crate::core::rules::{AddressSpec, Policy, PortSpec, Rule, RuleAction};

/// Tokens of a single rule line. Flags outrank bare words so `-p` lexes as
/// a flag even though the word pattern also covers it.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
enum Token<'src> {
    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Quoted(&'src str),

    #[regex(r"-{1,2}[A-Za-z][A-Za-z0-9-]*", priority = 3)]
    Flag(&'src str),

    #[regex(r"[^ \t]+", priority = 1)]
    Word(&'src str),
}

/// Parses a complete iptables-save dump into a policy.
///
/// Handles `*table` markers, `:CHAIN POLICY [pkts:bytes]` declarations,
/// `-A` rule lines, `COMMIT`, and comment lines. Comments are collected for
/// round-tripping except the tool-generated header/footer lines.
pub fn parse_iptables_save(input: &str) -> Policy {
    let mut policy = Policy::new();
    let mut table = String::from("filter");

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();

        if line.is_empty() || line == "COMMIT" {
            continue;
        }
        if let Some(name) = line.strip_prefix('*') {
            table = name.trim().to_string();
            continue;
        }
        if line.starts_with('#') {
            if !is_generated_header(line) {
                policy.comments.push(line.to_string());
            }
            continue;
        }
        if let Some(decl) = line.strip_prefix(':') {
            chain_declaration(&mut policy, &table, decl);
            continue;
        }
        if line.starts_with("-A") {
            match rule_from_line(&table, line_number, line) {
                Some(rule) => {
                    let chain = rule.chain.clone();
                    policy.chain_entry(&table, &chain).rules.push(rule);
                }
                None => {
                    tracing::warn!(line = line_number, text = line, "malformed rule line skipped");
                }
            }
            continue;
        }
        tracing::warn!(line = line_number, text = line, "unrecognized line skipped");
    }

    policy
}

/// Parses a single rule string outside a dump. Accepts both the full
/// `-A CHAIN …` append form and a bare flag sequence, which is attributed
/// to `filter`/`INPUT`.
pub fn parse_rule(raw: &str) -> Rule {
    let trimmed = raw.trim();
    if let Some(rule) = rule_from_line("filter", 1, trimmed) {
        return rule;
    }
    let wrapped = format!("-A INPUT {trimmed}");
    match rule_from_line("filter", 1, &wrapped) {
        Some(mut rule) => {
            rule.raw = trimmed.to_string();
            rule
        }
        None => Rule::new("filter", "INPUT", "RETURN", 1, trimmed),
    }
}

fn is_generated_header(line: &str) -> bool {
    line.starts_with("# Generated") || line.starts_with("# Completed")
}

/// `:NAME POLICY [pkts:bytes]`; a `-` policy marks a user-defined chain and
/// the policy defaults to ACCEPT.
fn chain_declaration(policy: &mut Policy, table: &str, decl: &str) {
    let mut parts = decl.split_whitespace();
    let Some(name) = parts.next() else {
        return;
    };
    let policy_token = parts.next().unwrap_or("-");
    let (packets, bytes) = parts.next().map_or((0, 0), counters);

    let chain = policy.chain_entry(table, name);
    chain.user_defined = policy_token == "-";
    chain.policy = policy_token.parse().unwrap_or_default();
    chain.packet_count = packets;
    chain.byte_count = bytes;
}

fn counters(token: &str) -> (u64, u64) {
    let inner = token.trim_start_matches('[').trim_end_matches(']');
    let Some((packets, bytes)) = inner.split_once(':') else {
        return (0, 0);
    };
    (packets.parse().unwrap_or(0), bytes.parse().unwrap_or(0))
}

/// Lexes one `-A CHAIN …` line into a rule. Returns `None` when the chain
/// name is missing. Unknown flags still land in the opaque parameter map so
/// nothing in the original text is silently dropped from the model.
fn rule_from_line(table: &str, line_number: usize, raw: &str) -> Option<Rule> {
    let body = raw.strip_prefix("-A")?.trim_start();

    let mut tokens = Vec::new();
    for token in Token::lexer(body) {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => tracing::debug!(line = line_number, "unlexable fragment ignored"),
        }
    }

    let mut iter = tokens.into_iter().peekable();
    let Some(Token::Word(chain)) = iter.next() else {
        return None;
    };

    // Match-only rules carry no -j; RETURN is the closest modelled
    // disposition to "continue to the next rule".
    let mut rule = Rule::new(table, chain, "RETURN", line_number, raw);
    let mut target: Option<String> = None;

    while let Some(token) = iter.next() {
        let Token::Flag(flag) = token else {
            tracing::debug!(line = line_number, ?token, "stray token in rule ignored");
            continue;
        };
        let value = match iter.peek() {
            Some(Token::Word(w)) => {
                let value = (*w).to_string();
                iter.next();
                Some(value)
            }
            Some(Token::Quoted(q)) => {
                let value = (*q).to_string();
                iter.next();
                Some(value)
            }
            _ => None,
        };

        match (flag, value.as_deref()) {
            ("-p", Some(v)) => rule.protocol = Some(v.to_string()),
            ("-s", Some(v)) => rule.source = Some(AddressSpec::new(v)),
            ("-d", Some(v)) => rule.destination = Some(AddressSpec::new(v)),
            ("--sport", Some(v)) => rule.source_port = Some(PortSpec::new(v)),
            ("--dport", Some(v)) => rule.destination_port = Some(PortSpec::new(v)),
            ("-i", Some(v)) => rule.in_interface = Some(v.to_string()),
            ("-o", Some(v)) => rule.out_interface = Some(v.to_string()),
            ("-j", Some(v)) => target = Some(v.to_string()),
            ("--ctstate" | "--state", Some(v)) => rule.state = Some(v.to_string()),
            _ => {}
        }

        let key = flag.trim_start_matches('-').to_string();
        let entry = match value {
            Some(v) => serde_json::Value::String(v),
            None => serde_json::Value::Bool(true),
        };
        rule.parameters.insert(key, entry);
    }

    if let Some(target) = target {
        rule.action = RuleAction::from_target(&target);
    }
    Some(rule)
}
