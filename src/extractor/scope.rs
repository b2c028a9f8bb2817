// file: src/extractor/scope.rs
// description: public ipv4 scope filter for enrichment eligibility
// reference: https://www.iana.org/assignments/iana-ipv4-special-registry

use std::net::Ipv4Addr;
use std::str::FromStr;

/// True for a well-formed, globally routable unicast IPv4 address.
pub fn is_eligible(candidate: &str) -> bool {
    Ipv4Addr::from_str(candidate)
        .map(is_global_unicast)
        .unwrap_or(false)
}

pub fn is_global_unicast(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();

    if ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
    {
        return false;
    }

    // "this network" 0.0.0.0/8
    if a == 0 {
        return false;
    }

    // shared address space 100.64.0.0/10
    if a == 100 && (b & 0b1100_0000) == 64 {
        return false;
    }

    // ietf protocol assignments 192.0.0.0/24
    if a == 192 && b == 0 && c == 0 {
        return false;
    }

    // benchmarking 198.18.0.0/15
    if a == 198 && (b & 0xfe) == 18 {
        return false;
    }

    // reserved 240.0.0.0/4
    a < 240
}
