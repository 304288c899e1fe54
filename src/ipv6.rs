//! Colon-hex IPv6 codec, CIDR expansion, RFC 1924 encoding and validators.

use crate::error::{Error, Result};
use crate::ipv4;
use lazy_static::lazy_static;
use regex::Regex;
use std::iter;

/// Width of an IPv6 address in bits.
pub const BITS: u8 = 128;
/// Lowest IPv6 integer.
pub const MIN_IP: u128 = 0;
/// Highest IPv6 integer.
pub const MAX_IP: u128 = u128::MAX;

/// Absence of an address, only valid as source address (RFC 4291).
pub const UNSPECIFIED_ADDRESS: &str = "::/128";
/// Loopback address on the local host (RFC 4291).
pub const LOOPBACK: &str = "::1/128";
pub const LOCALHOST: &str = LOOPBACK;
/// IPv4 addresses mapped into IPv6 (RFC 4291).
pub const IPV4_MAPPED: &str = "::ffff:0:0/96";
/// Documentation network (RFC 3849).
pub const DOCUMENTATION_NETWORK: &str = "2001:db8::/32";
/// 6to4 (RFC 3056).
pub const IPV6_TO_IPV4_NETWORK: &str = "2002::/16";
/// Teredo (RFC 4380).
pub const TEREDO_NETWORK: &str = "2001::/32";
/// Unique local addresses (RFC 4193).
pub const PRIVATE_NETWORK: &str = "fd00::/8";
/// Link-local unicast (RFC 4291).
pub const LINK_LOCAL: &str = "fe80::/10";
/// Multicast (RFC 4291).
pub const MULTICAST: &str = "ff00::/8";
pub const MULTICAST_LOOPBACK: &str = "ff01::/16";
pub const MULTICAST_LOCAL: &str = "ff02::/16";
pub const MULTICAST_SITE: &str = "ff05::/16";
pub const MULTICAST_ORGANIZATION: &str = "ff08::/16";
pub const MULTICAST_GLOBAL: &str = "ff0e::/16";
/// All nodes on the local segment.
pub const MULTICAST_LOCAL_NODES: &str = "ff02::1";
/// All routers on the local segment.
pub const MULTICAST_LOCAL_ROUTERS: &str = "ff02::2";
/// All DHCP servers and relay agents on the local segment.
pub const MULTICAST_LOCAL_DHCP: &str = "ff02::1:2";
/// All DHCP servers and relay agents on the local site.
pub const MULTICAST_SITE_DHCP: &str = "ff05::1:3";

/// Upper 96 bits of an address inside `::ffff:0:0/96`.
pub(crate) const MAPPED_IPV4_PREFIX: u128 = 0xffff;

const RFC1924_ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

fn hextets(part: &str, s: &str) -> Result<Vec<u16>> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[0-9a-fA-F]+$").expect("Not possible");
    }
    if part.is_empty() {
        return Ok(Vec::new());
    }
    part.split(':')
        .map(|h| {
            if !RE.is_match(h) {
                return Err(Error::format(format!("bad group {:?} in {:?}", h, s)));
            }
            if h.trim_start_matches('0').len() > 4 {
                return Err(Error::range(format!("group {:?} of {:?} exceeds ffff", h, s)));
            }
            if h.len() > 4 {
                return Err(Error::format(format!("group {:?} of {:?} is too long", h, s)));
            }
            u16::from_str_radix(h, 16).map_err(|e| Error::format(e.to_string()))
        })
        .collect()
}

/// Converts a colon-hex address, optionally ending in an embedded
/// dotted-quad (`::ffff:192.0.2.128`), to its 128-bit integer.
pub fn ip_to_int(s: &str) -> Result<u128> {
    let (hex, low) = match s.rfind(':') {
        Some(i) if s[i + 1..].contains('.') => {
            let quad = &s[i + 1..];
            if quad.split('.').count() != 4 {
                return Err(Error::format(format!(
                    "embedded IPv4 {:?} needs four octets",
                    quad
                )));
            }
            let hex = &s[..=i];
            let hex = if hex.ends_with("::") { hex } else { &s[..i] };
            (hex, Some(ipv4::ip_to_int(quad)?))
        }
        _ => (s, None),
    };

    let halves: Vec<&str> = hex.split("::").collect();
    if halves.len() > 2 {
        return Err(Error::format(format!("{:?} has more than one \"::\"", s)));
    }
    let compressed = halves.len() == 2;
    let mut head = hextets(halves[0], s)?;
    let mut tail = match halves.get(1) {
        Some(part) => hextets(part, s)?,
        None => Vec::new(),
    };
    if let Some(v4) = low {
        let last = if compressed { &mut tail } else { &mut head };
        last.push((v4 >> 16) as u16);
        last.push(v4 as u16);
    }

    let explicit = head.len() + tail.len();
    if (compressed && explicit > 7) || (!compressed && explicit != 8) {
        return Err(Error::format(format!(
            "{:?} has {} groups, expected eight",
            s, explicit
        )));
    }
    let zeros = 8 - explicit;
    Ok(head
        .iter()
        .chain(iter::repeat(&0).take(zeros))
        .chain(tail.iter())
        .fold(0u128, |ip, &h| ip << 16 | u128::from(h)))
}

/// Renders an integer in canonical form: lower-case groups without leading
/// zeros and the left-most longest run of zero groups compressed to `::`.
pub fn int_to_ip(ip: u128) -> String {
    let groups: Vec<u16> = (0..8).rev().map(|i| (ip >> (16 * i)) as u16).collect();

    let (mut best, mut run) = ((0, 0), (0, 0));
    for (i, &g) in groups.iter().enumerate() {
        if g != 0 {
            run.1 = 0;
            continue;
        }
        if run.1 == 0 {
            run.0 = i;
        }
        run.1 += 1;
        if run.1 > best.1 {
            best = run;
        }
    }

    let join = |gs: &[u16]| {
        gs.iter()
            .map(|g| format!("{:x}", g))
            .collect::<Vec<_>>()
            .join(":")
    };
    if best.1 > 1 {
        format!(
            "{}::{}",
            join(&groups[..best.0]),
            join(&groups[best.0 + best.1..])
        )
    } else {
        join(&groups)
    }
}

/// Twenty-character base-85 form of RFC 1924.
pub fn int_to_rfc1924(ip: u128) -> String {
    let mut digits = [b'0'; 20];
    let mut rest = ip;
    for d in digits.iter_mut().rev() {
        *d = RFC1924_ALPHABET[(rest % 85) as usize];
        rest /= 85;
    }
    digits.iter().map(|&b| b as char).collect()
}

pub fn rfc1924_to_int(s: &str) -> Result<u128> {
    if s.len() != 20 {
        return Err(Error::format(format!(
            "{:?} is not twenty base-85 digits",
            s
        )));
    }
    s.bytes().try_fold(0u128, |acc, b| {
        let d = RFC1924_ALPHABET
            .iter()
            .position(|&a| a == b)
            .ok_or_else(|| Error::format(format!("{:?} is not a base-85 digit", b as char)))?;
        acc.checked_mul(85)
            .and_then(|v| v.checked_add(d as u128))
            .ok_or_else(|| Error::range(format!("{:?} exceeds 128 bits", s)))
    })
}

pub(crate) fn block(network: u128, prefix: u8) -> (u128, u128) {
    let mask = u128::MAX
        .checked_shl(u32::from(BITS - prefix))
        .unwrap_or(0);
    let start = network & mask;
    (start, start | !mask)
}

/// Expands `address/prefix` into the inclusive bounds of the block.
///
/// Text without a `/` is a block holding that single address.
pub fn cidr_to_block(s: &str) -> Result<(u128, u128)> {
    match s.split_once('/') {
        None => {
            let ip = ip_to_int(s)?;
            Ok((ip, ip))
        }
        Some((ip, prefix)) => {
            let prefix = crate::parse_prefix(prefix, BITS)?;
            Ok(block(ip_to_int(ip)?, prefix))
        }
    }
}

pub fn validate_ip(s: &str) -> bool {
    ip_to_int(s).is_ok()
}

pub fn validate_cidr(s: &str) -> bool {
    cidr_to_block(s).is_ok()
}
