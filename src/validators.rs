//! Input validation for parsed rule fields
//!
//! Detection itself is fail-soft and never rejects a rule, so these checks
//! exist to surface malformed field text to the caller instead of letting
//! it silently degrade match precision.

use crate::core::error::{self, Error};
use crate::core::rules::{AddressSpec, Policy, PortSpec, Rule};

/// Validates a single port number.
///
/// # Errors
///
/// Returns `Err` if port is 0 (reserved).
pub fn validate_port(port: u16) -> Result<u16, String> {
    if port == 0 {
        Err("Port must be between 1 and 65535".to_string())
    } else {
        Ok(port)
    }
}

/// Validates a port range.
///
/// # Errors
///
/// Returns `Err` if:
/// - Either port is 0
/// - Start port is greater than end port
pub fn validate_port_range(start: u16, end: u16) -> Result<(u16, u16), String> {
    validate_port(start)?;
    validate_port(end)?;

    if start > end {
        Err("Start port must be less than or equal to end port".to_string())
    } else {
        Ok((start, end))
    }
}

/// Validates a port specification as written in a rule (`22`, `1024:2048`,
/// `1024-2048`).
///
/// # Errors
///
/// Returns `Err` if the text does not parse as a port or range, or the
/// parsed range violates [`validate_port_range`].
pub fn validate_port_spec(spec: &PortSpec) -> Result<(), String> {
    let Some(range) = spec.range() else {
        return Err(format!("Invalid port specification: {spec}"));
    };
    validate_port_range(range.start, range.end)?;
    Ok(())
}

/// Validates an address specification: `any`, a host address, or a CIDR
/// network.
///
/// # Errors
///
/// Returns `Err` if the text is none of the accepted forms.
pub fn validate_address_spec(spec: &AddressSpec) -> Result<(), String> {
    if spec.is_unrestricted() || spec.network().is_some() {
        Ok(())
    } else {
        Err(format!("Invalid address specification: {spec}"))
    }
}

/// Validates a network interface name.
///
/// Linux kernel interface name rules:
/// - Max 15 characters (IFNAMSIZ - 1)
/// - Alphanumeric, dot, dash, underscore only
/// - Cannot be "." or ".."
///
/// # Errors
///
/// Returns `Err` if interface name violates kernel constraints.
pub fn validate_interface(name: &str) -> Result<String, String> {
    if name.is_empty() {
        return Ok(String::new());
    }

    if name.len() > 15 {
        return Err("Interface name too long (max 15 characters)".to_string());
    }

    if name == "." || name == ".." {
        return Err("Invalid interface name".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err("Interface name contains invalid characters".to_string());
    }

    Ok(name.to_string())
}

/// Checks every populated field of a rule and returns the list of
/// violations. An empty list means the rule is well formed.
///
/// An unset chain is a parser contract violation. Malformed match fields
/// are reported but do not stop analysis, which degrades to conservative
/// answers for them.
pub fn validate_rule(rule: &Rule) -> Vec<String> {
    let mut violations = Vec::new();

    if rule.chain.is_empty() {
        violations.push("Rule has no chain".to_string());
    }
    if rule.table.is_empty() {
        violations.push("Rule has no table".to_string());
    }

    if let Some(source) = &rule.source
        && let Err(message) = validate_address_spec(source)
    {
        violations.push(format!("source: {message}"));
    }
    if let Some(destination) = &rule.destination
        && let Err(message) = validate_address_spec(destination)
    {
        violations.push(format!("destination: {message}"));
    }
    if let Some(sport) = &rule.source_port
        && let Err(message) = validate_port_spec(sport)
    {
        violations.push(format!("source port: {message}"));
    }
    if let Some(dport) = &rule.destination_port
        && let Err(message) = validate_port_spec(dport)
    {
        violations.push(format!("destination port: {message}"));
    }
    if let Some(iface) = &rule.in_interface
        && let Err(message) = validate_interface(iface)
    {
        violations.push(format!("in-interface: {message}"));
    }
    if let Some(iface) = &rule.out_interface
        && let Err(message) = validate_interface(iface)
    {
        violations.push(format!("out-interface: {message}"));
    }

    violations
}

/// Strict whole-policy validation for callers that want malformed input to
/// be an error instead of a degraded analysis.
///
/// # Errors
///
/// Returns the first violation found, identified by the offending rule's
/// dump line number.
pub fn validate_policy(policy: &Policy) -> error::Result<()> {
    for rule in policy.all_rules() {
        if let Some(message) = validate_rule(rule).into_iter().next() {
            return Err(Error::Validation {
                field: format!("rule at line {}", rule.line_number),
                message,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_iptables_save, parse_rule};

    #[test]
    fn test_validate_port_zero() {
        assert!(validate_port(0).is_err());
    }

    #[test]
    fn test_validate_port_valid() {
        assert_eq!(validate_port(1).unwrap(), 1);
        assert_eq!(validate_port(80).unwrap(), 80);
        assert_eq!(validate_port(65535).unwrap(), 65535);
    }

    #[test]
    fn test_validate_port_range_valid() {
        assert_eq!(validate_port_range(80, 80).unwrap(), (80, 80));
        assert_eq!(validate_port_range(1, 1024).unwrap(), (1, 1024));
        assert_eq!(validate_port_range(8000, 9000).unwrap(), (8000, 9000));
    }

    #[test]
    fn test_validate_port_range_invalid() {
        assert!(validate_port_range(0, 100).is_err());
        assert!(validate_port_range(100, 0).is_err());
        assert!(validate_port_range(100, 50).is_err());
    }

    #[test]
    fn test_validate_port_spec() {
        assert!(validate_port_spec(&PortSpec::new("22")).is_ok());
        assert!(validate_port_spec(&PortSpec::new("1024:2048")).is_ok());
        assert!(validate_port_spec(&PortSpec::new("1024-2048")).is_ok());
        assert!(validate_port_spec(&PortSpec::new("2048:1024")).is_err());
        assert!(validate_port_spec(&PortSpec::new("https")).is_err());
        assert!(validate_port_spec(&PortSpec::new("0")).is_err());
    }

    #[test]
    fn test_validate_address_spec() {
        assert!(validate_address_spec(&AddressSpec::new("192.168.1.0/24")).is_ok());
        assert!(validate_address_spec(&AddressSpec::new("10.0.0.1")).is_ok());
        assert!(validate_address_spec(&AddressSpec::new("fe80::/10")).is_ok());
        assert!(validate_address_spec(&AddressSpec::new("any")).is_ok());
        assert!(validate_address_spec(&AddressSpec::new("not-an-ip")).is_err());
        assert!(validate_address_spec(&AddressSpec::new("300.1.1.1")).is_err());
    }

    #[test]
    fn test_validate_interface_valid() {
        assert!(validate_interface("eth0").is_ok());
        assert!(validate_interface("br0.100").is_ok());
        assert!(validate_interface("wlan_2").is_ok());
        assert!(validate_interface("lo").is_ok());
        assert!(validate_interface("enp3s0").is_ok());
    }

    #[test]
    fn test_validate_interface_empty() {
        assert!(validate_interface("").is_ok());
    }

    #[test]
    fn test_validate_interface_invalid() {
        assert!(validate_interface(".").is_err());
        assert!(validate_interface("..").is_err());
        assert!(validate_interface("eth0 ; rm -rf /").is_err());
        assert!(validate_interface("test|pipe").is_err());
    }

    #[test]
    fn test_validate_interface_too_long() {
        let long_name = "a".repeat(16);
        assert!(validate_interface(&long_name).is_err());
    }

    #[test]
    fn test_validate_interface_max_length() {
        let name = "a".repeat(15);
        assert!(validate_interface(&name).is_ok());
    }

    #[test]
    fn test_validate_rule_well_formed() {
        let rule = parse_rule("-A INPUT -p tcp -s 192.168.1.0/24 --dport 22 -j ACCEPT");
        assert!(validate_rule(&rule).is_empty());
    }

    #[test]
    fn test_validate_rule_collects_all_violations() {
        let rule = parse_rule("-A INPUT -s not-an-ip --dport bogus -i way-too-long-name -j DROP");
        let violations = validate_rule(&rule);
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().any(|v| v.starts_with("source:")));
        assert!(violations.iter().any(|v| v.starts_with("destination port:")));
        assert!(violations.iter().any(|v| v.starts_with("in-interface:")));
    }

    #[test]
    fn test_validate_policy_strict() {
        let good = parse_iptables_save(
            "*filter\n:INPUT ACCEPT [0:0]\n-A INPUT -p tcp --dport 22 -j ACCEPT\nCOMMIT\n",
        );
        assert!(validate_policy(&good).is_ok());

        let bad = parse_iptables_save(
            "*filter\n:INPUT ACCEPT [0:0]\n-A INPUT -s not-an-ip -j DROP\nCOMMIT\n",
        );
        let err = validate_policy(&bad).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_validate_rule_empty_chain() {
        let mut rule = parse_rule("-A INPUT -j ACCEPT");
        rule.chain.clear();
        let violations = validate_rule(&rule);
        assert_eq!(violations, vec!["Rule has no chain".to_string()]);
    }
}
