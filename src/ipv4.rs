//! Dotted-quad IPv4 codec, CIDR/netmask expansion and validators.
//!
//! Besides the full four-octet form, partial addresses are accepted: a
//! single group is the first octet (`127` is `127.0.0.0`) and otherwise the
//! last group is the host octet (`127.1` is `127.0.0.1`). When the text is
//! the base of a network (`127.1/16`, `127.1/255.255.0.0`) every group is a
//! network octet instead (`127.1.0.0`).

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::net::Ipv4Addr;

/// Width of an IPv4 address in bits.
pub const BITS: u8 = 32;
/// Lowest IPv4 integer.
pub const MIN_IP: u32 = 0;
/// Highest IPv4 integer.
pub const MAX_IP: u32 = u32::MAX;

/// Current network, only valid as source address (RFC 5735).
pub const CURRENT_NETWORK: &str = "0.0.0.0/8";
/// Private network (RFC 1918).
pub const PRIVATE_NETWORK_10: &str = "10.0.0.0/8";
/// Carrier-grade NAT (RFC 6598).
pub const SHARED_ADDRESS_SPACE: &str = "100.64.0.0/10";
/// Loopback addresses on the local host (RFC 5735).
pub const LOOPBACK: &str = "127.0.0.0/8";
/// Common `localhost` address (RFC 5735).
pub const LOCALHOST: &str = "127.0.0.1";
/// Autoconfiguration when no address is available (RFC 3927).
pub const LINK_LOCAL: &str = "169.254.0.0/16";
/// Private network (RFC 1918).
pub const PRIVATE_NETWORK_172_16: &str = "172.16.0.0/12";
/// IETF protocol assignments (RFC 5735).
pub const IETF_PROTOCOL_RESERVED: &str = "192.0.0.0/24";
/// Dual-Stack Lite link addresses (RFC 6333).
pub const DUAL_STACK_LITE: &str = "192.0.0.0/29";
/// Documentation network (RFC 5737).
pub const TEST_NET_1: &str = "192.0.2.0/24";
/// 6to4 anycast relays (RFC 3068).
pub const IPV6_TO_IPV4_RELAY: &str = "192.88.99.0/24";
/// Private network (RFC 1918).
pub const PRIVATE_NETWORK_192_168: &str = "192.168.0.0/16";
/// Inter-network benchmark testing (RFC 2544).
pub const BENCHMARK_TESTS: &str = "198.18.0.0/15";
/// Documentation network (RFC 5737).
pub const TEST_NET_2: &str = "198.51.100.0/24";
/// Documentation network (RFC 5737).
pub const TEST_NET_3: &str = "203.0.113.0/24";
/// Multicast (RFC 5771).
pub const MULTICAST: &str = "224.0.0.0/4";
/// Link local multicast (RFC 5771).
pub const MULTICAST_LOCAL: &str = "224.0.0.0/24";
/// Forwardable multicast (RFC 5771).
pub const MULTICAST_INTERNETWORK: &str = "224.0.1.0/24";
/// Former class E space (RFC 1700).
pub const RESERVED: &str = "240.0.0.0/4";
/// Limited broadcast, only valid as destination address (RFC 919).
pub const BROADCAST: &str = "255.255.255.255";

fn octets(s: &str) -> Result<Vec<u32>> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^([0-9]{1,3}\.){0,3}[0-9]{1,3}$").expect("Not possible");
    }
    if !RE.is_match(s) {
        return Err(Error::format(format!("{:?} is not a dotted-quad address", s)));
    }
    s.split('.')
        .map(|q| {
            let v = q.parse::<u32>().map_err(|e| Error::format(e.to_string()))?;
            if v > 255 {
                return Err(Error::range(format!("octet {} of {:?} exceeds 255", v, s)));
            }
            Ok(v)
        })
        .collect()
}

/// Converts a dotted-quad address to its network byte order integer.
pub fn ip_to_int(s: &str) -> Result<u32> {
    match octets(s)?.split_last() {
        Some((first, [])) => Ok(first << 24),
        Some((host, net)) => Ok(net
            .iter()
            .zip([24u32, 16, 8].iter())
            .fold(*host, |ip, (q, shift)| ip | q << shift)),
        None => Err(Error::format("empty address")),
    }
}

/// Converts a dotted-quad address to a network number, treating every
/// supplied group as a network octet (`127.1` is `127.1.0.0`).
pub fn ip_to_network(s: &str) -> Result<u32> {
    Ok(octets(s)?
        .iter()
        .zip([24u32, 16, 8, 0].iter())
        .fold(0, |ip, (q, shift)| ip | q << shift))
}

/// Renders an integer as a dotted-quad address.
pub fn int_to_ip(ip: u32) -> String {
    Ipv4Addr::from(ip).to_string()
}

/// Eight lower-case hex digits of the address integer.
pub fn ip_to_hex(s: &str) -> Result<String> {
    Ok(format!("{:08x}", ip_to_int(s)?))
}

pub fn hex_to_ip(s: &str) -> Result<String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::format(format!("{:?} is not a hex number", s)));
    }
    let v = u128::from_str_radix(s, 16)
        .map_err(|_| Error::range(format!("{:?} does not fit an address", s)))?;
    if v > u128::from(MAX_IP) {
        return Err(Error::range(format!("{:#x} exceeds {:#x}", v, MAX_IP)));
    }
    Ok(int_to_ip(v as u32))
}

pub(crate) fn block(network: u32, prefix: u8) -> (u32, u32) {
    let mask = u32::MAX.checked_shl(u32::from(BITS - prefix)).unwrap_or(0);
    let start = network & mask;
    (start, start | !mask)
}

/// Expands `address/prefix` into the inclusive bounds of the block.
///
/// Text without a `/` is a block holding that single address.
pub fn cidr_to_block(s: &str) -> Result<(u32, u32)> {
    match s.split_once('/') {
        None => {
            let ip = ip_to_int(s)?;
            Ok((ip, ip))
        }
        Some((ip, prefix)) => {
            let prefix = crate::parse_prefix(prefix, BITS)?;
            Ok(block(ip_to_network(ip)?, prefix))
        }
    }
}

/// Prefix length of a netmask whose bits are a contiguous run of ones.
pub fn netmask_to_prefix(s: &str) -> Result<u8> {
    let mask = ip_to_network(s)?;
    if mask.leading_ones() + mask.trailing_zeros() != u32::from(BITS) {
        return Err(Error::format(format!("netmask {:?} is not contiguous", s)));
    }
    Ok(mask.leading_ones() as u8)
}

pub fn prefix_to_netmask(prefix: u8) -> Result<String> {
    if prefix > BITS {
        return Err(Error::range(format!("prefix /{} exceeds {}", prefix, BITS)));
    }
    Ok(int_to_ip(!block(0, prefix).1))
}

/// Bounds of the block named by a base address and a netmask.
pub fn subnet_to_block(address: &str, netmask: &str) -> Result<(u32, u32)> {
    let prefix = netmask_to_prefix(netmask)?;
    Ok(block(ip_to_network(address)?, prefix))
}

pub fn validate_ip(s: &str) -> bool {
    ip_to_int(s).is_ok()
}

pub fn validate_cidr(s: &str) -> bool {
    cidr_to_block(s).is_ok()
}

pub fn validate_netmask(s: &str) -> bool {
    netmask_to_prefix(s).is_ok()
}

pub fn validate_subnet(address: &str, netmask: &str) -> bool {
    subnet_to_block(address, netmask).is_ok()
}
