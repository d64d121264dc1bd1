//! Router ID selection.
//!
//! The router ID is the highest loopback address when any loopback is
//! configured, otherwise the highest interface address. Addresses compare as
//! unsigned bytes of their 4-byte form.

use std::cmp::Ordering;
use std::net::Ipv4Addr;

use crate::RouterId;
use crate::error::TopologyError;

/// Byte-wise unsigned comparison of two IPv4 addresses.
pub fn compare_addresses(a: &Ipv4Addr, b: &Ipv4Addr) -> Ordering {
    a.octets().cmp(&b.octets())
}

/// Orders router IDs the way OSPF does, numerically over their dotted-quad
/// form. IDs that are not IPv4 addresses sort below every valid one.
pub fn compare_router_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<Ipv4Addr>(), b.parse::<Ipv4Addr>()) {
        (Ok(a), Ok(b)) => compare_addresses(&a, &b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn highest_address(addresses: &[Ipv4Addr]) -> Option<Ipv4Addr> {
    addresses.iter().copied().max_by(compare_addresses)
}

/// Returns an empty ID when neither list holds an address.
pub fn determine_router_id(loopbacks: &[Ipv4Addr], interfaces: &[Ipv4Addr]) -> RouterId {
    let candidates = if loopbacks.is_empty() {
        interfaces
    } else {
        loopbacks
    };

    highest_address(candidates)
        .map(|address| address.to_string())
        .unwrap_or_default()
}

pub fn parse_address(text: &str) -> Result<Ipv4Addr, TopologyError> {
    text.trim()
        .parse()
        .map_err(|_| TopologyError::InvalidAddress(text.to_string()))
}
