//! Containment and overlap predicates for address and port specifications
//!
//! These three predicates are the only interval reasoning in the crate;
//! every detector composes them. They are deliberately conservative: a
//! specification that fails to parse is treated as potentially overlapping
//! (a false positive to investigate beats a missed conflict), and
//! containment falls back to exact string equality.

use ipnetwork::IpNetwork;

use crate::core::rules::{AddressSpec, PortSpec};

/// True when the two address specifications denote overlapping address
/// sets. An absent specification means "any" and overlaps everything.
pub fn address_overlaps(a: Option<&AddressSpec>, b: Option<&AddressSpec>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return true;
    };
    match (a.network(), b.network()) {
        (Some(na), Some(nb)) => networks_overlap(na, nb),
        // Fail open: unparsable input may still describe the same traffic.
        _ => true,
    }
}

/// True when `general` subsumes every address `specific` can match.
///
/// An absent `general` is "any" and contains everything; an absent
/// `specific` is only contained when `general` is also absent. Unparsable
/// input falls back to exact string equality.
pub fn address_contains(general: Option<&AddressSpec>, specific: Option<&AddressSpec>) -> bool {
    let Some(general) = general else {
        return true;
    };
    let Some(specific) = specific else {
        return false;
    };
    match (general.network(), specific.network()) {
        (Some(g), Some(s)) => network_contains(g, s),
        _ => general.as_str() == specific.as_str(),
    }
}

/// True when the `general` port specification contains the `specific` one,
/// comparing inclusive integer intervals. An absent `general` is "any
/// port". Unparsable input falls back to string equality.
pub fn port_contains(general: Option<&PortSpec>, specific: Option<&PortSpec>) -> bool {
    let Some(general) = general else {
        return true;
    };
    let Some(specific) = specific else {
        return false;
    };
    match (general.range(), specific.range()) {
        (Some(g), Some(s)) => g.start <= s.start && s.end <= g.end,
        _ => general.as_str() == specific.as_str(),
    }
}

/// CIDR prefixes overlap iff one contains the other's network address;
/// mixed address families never overlap.
fn networks_overlap(a: IpNetwork, b: IpNetwork) -> bool {
    match (a, b) {
        (IpNetwork::V4(a), IpNetwork::V4(b)) => a.overlaps(b),
        (IpNetwork::V6(a), IpNetwork::V6(b)) => a.overlaps(b),
        _ => false,
    }
}

/// Supernet-or-equal relation; mixed address families never contain.
fn network_contains(general: IpNetwork, specific: IpNetwork) -> bool {
    match (general, specific) {
        (IpNetwork::V4(g), IpNetwork::V4(s)) => g == s || g.is_supernet_of(s),
        (IpNetwork::V6(g), IpNetwork::V6(s)) => g == s || g.is_supernet_of(s),
        _ => false,
    }
}
