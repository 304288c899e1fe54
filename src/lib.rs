//! Parsing, validation and membership tests for IPv4 and IPv6 addresses
//! written as dotted-quads, hextets, CIDR blocks or address/netmask pairs.
//!
//! ```
//! use iptools::{IpRangeList, RangeSpec};
//!
//! let allowed = IpRangeList::from_specs(vec![
//!     RangeSpec::from("127.0.0.1"),
//!     RangeSpec::from("192.168/16"),
//!     RangeSpec::from(("10.0.0.1", "10.0.0.19")),
//! ])
//! .unwrap();
//!
//! assert!(allowed.contains("192.168.5.5"));
//! assert!(allowed.contains("10.0.0.10"));
//! assert!(!allowed.contains("8.8.8.8"));
//! ```

pub mod error;
pub mod ipv4;
pub mod ipv6;
pub mod list;
pub mod range;

pub use error::{Error, Result};
pub use list::IpRangeList;
pub use range::{IpRange, RangeSpec};

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family, which fixes the integer width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    pub fn bits(self) -> u8 {
        match self {
            Family::V4 => ipv4::BITS,
            Family::V6 => ipv6::BITS,
        }
    }

    /// Largest integer an address of this family can take.
    pub fn max(self) -> u128 {
        match self {
            Family::V4 => u128::from(ipv4::MAX_IP),
            Family::V6 => ipv6::MAX_IP,
        }
    }

    // Callers guarantee `value <= self.max()`.
    pub(crate) fn render(self, value: u128) -> String {
        match self {
            Family::V4 => ipv4::int_to_ip(value as u32),
            Family::V6 => ipv6::int_to_ip(value),
        }
    }
}

/// An address integer tagged with its family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    family: Family,
    value: u128,
}

impl Address {
    pub fn new(value: u128, family: Family) -> Result<Self> {
        if value > family.max() {
            return Err(Error::range(format!(
                "{} does not fit in {} bits",
                value,
                family.bits()
            )));
        }
        Ok(Address { family, value })
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// The IPv4 address carried by an address inside `::ffff:0:0/96`.
    pub fn to_mapped_ipv4(&self) -> Option<Address> {
        match self.family {
            Family::V6 if self.value >> 32 == ipv6::MAPPED_IPV4_PREFIX => Some(Address {
                family: Family::V4,
                value: self.value & u128::from(ipv4::MAX_IP),
            }),
            _ => None,
        }
    }
}

impl FromStr for Address {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        if s.contains(':') {
            Ok(Address {
                family: Family::V6,
                value: ipv6::ip_to_int(s)?,
            })
        } else {
            Ok(Address::from(ipv4::ip_to_int(s)?))
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.family.render(self.value))
    }
}

impl From<u32> for Address {
    fn from(ip: u32) -> Self {
        Address {
            family: Family::V4,
            value: u128::from(ip),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::from(u32::from(ip))
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Address {
            family: Family::V6,
            value: u128::from(ip),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(ip) => ip.into(),
            IpAddr::V6(ip) => ip.into(),
        }
    }
}

/// Anything a membership query can be asked about: address text, a `u32`
/// (IPv4), a `u128` (IPv6), the `std::net` types or an [`Address`].
pub trait ToAddress {
    fn to_address(&self) -> Result<Address>;
}

impl ToAddress for str {
    fn to_address(&self) -> Result<Address> {
        self.parse()
    }
}

impl ToAddress for String {
    fn to_address(&self) -> Result<Address> {
        self.parse()
    }
}

impl ToAddress for u32 {
    fn to_address(&self) -> Result<Address> {
        Ok(Address::from(*self))
    }
}

impl ToAddress for u128 {
    fn to_address(&self) -> Result<Address> {
        Address::new(*self, Family::V6)
    }
}

impl ToAddress for Address {
    fn to_address(&self) -> Result<Address> {
        Ok(*self)
    }
}

impl ToAddress for Ipv4Addr {
    fn to_address(&self) -> Result<Address> {
        Ok(Address::from(*self))
    }
}

impl ToAddress for Ipv6Addr {
    fn to_address(&self) -> Result<Address> {
        Ok(Address::from(*self))
    }
}

impl ToAddress for IpAddr {
    fn to_address(&self) -> Result<Address> {
        Ok(Address::from(*self))
    }
}

impl<T: ToAddress + ?Sized> ToAddress for &T {
    fn to_address(&self) -> Result<Address> {
        (**self).to_address()
    }
}

/// Parses address text of either family into its integer.
pub fn address_to_integer(s: &str) -> Result<u128> {
    Ok(s.parse::<Address>()?.value())
}

/// Renders an integer as address text of the given family.
pub fn integer_to_address(value: u128, family: Family) -> Result<String> {
    Ok(Address::new(value, family)?.to_string())
}

pub(crate) fn parse_prefix(s: &str, bits: u8) -> Result<u8> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[0-9]{1,3}$").expect("Not possible");
    }
    if !RE.is_match(s) {
        return Err(Error::format(format!("prefix {:?} is not a number", s)));
    }
    let prefix = s
        .parse::<u16>()
        .map_err(|e| Error::format(e.to_string()))?;
    if prefix > u16::from(bits) {
        return Err(Error::range(format!("prefix /{} exceeds {}", prefix, bits)));
    }
    Ok(prefix as u8)
}
