use crate::error::{Error, Result};
use crate::{ipv4, ipv6, Address, Family, ToAddress};
use log::{debug, trace};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};
use std::str::FromStr;

/// The ways a contiguous block of addresses can be written down.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    /// A single address, `address/prefix`, `address/netmask` or `start-end`.
    Block(String),
    /// Inclusive endpoints, in either order.
    Pair(String, String),
}

impl From<&str> for RangeSpec {
    fn from(s: &str) -> Self {
        RangeSpec::Block(s.to_owned())
    }
}

impl From<String> for RangeSpec {
    fn from(s: String) -> Self {
        RangeSpec::Block(s)
    }
}

impl From<(&str, &str)> for RangeSpec {
    fn from((start, end): (&str, &str)) -> Self {
        RangeSpec::Pair(start.to_owned(), end.to_owned())
    }
}

impl From<(String, String)> for RangeSpec {
    fn from((start, end): (String, String)) -> Self {
        RangeSpec::Pair(start, end)
    }
}

impl From<IpRange> for RangeSpec {
    fn from(range: IpRange) -> Self {
        if range.start == range.end {
            RangeSpec::Block(range.first())
        } else {
            RangeSpec::Pair(range.first(), range.last())
        }
    }
}

/// Inclusive interval of addresses of one family.
///
/// Built from two endpoints, a CIDR block or a base address with a netmask;
/// all of them end up as the same `[start, end]` pair of integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RangeSpec", into = "RangeSpec")]
pub struct IpRange {
    start: u128,
    end: u128,
    family: Family,
}

impl IpRange {
    /// Range between two addresses; the smaller one becomes the start.
    pub fn new(start: &str, end: &str) -> Result<Self> {
        Self::from_addresses(start.parse()?, end.parse()?)
    }

    pub fn from_addresses(a: Address, b: Address) -> Result<Self> {
        if a.family() != b.family() {
            return Err(Error::format(format!(
                "{} and {} belong to different families",
                a, b
            )));
        }
        let range = IpRange {
            start: a.value().min(b.value()),
            end: a.value().max(b.value()),
            family: a.family(),
        };
        trace!("range {} from endpoints", range);
        Ok(range)
    }

    pub fn from_integers(start: u128, end: u128, family: Family) -> Result<Self> {
        Self::from_addresses(Address::new(start, family)?, Address::new(end, family)?)
    }

    /// Range covering a CIDR block of either family.
    pub fn from_cidr(s: &str) -> Result<Self> {
        let range = if s.contains(':') {
            let (start, end) = ipv6::cidr_to_block(s)?;
            IpRange {
                start,
                end,
                family: Family::V6,
            }
        } else {
            let (start, end) = ipv4::cidr_to_block(s)?;
            IpRange {
                start: u128::from(start),
                end: u128::from(end),
                family: Family::V4,
            }
        };
        trace!("range {} from block {:?}", range, s);
        Ok(range)
    }

    /// Range covering an IPv4 base address and netmask.
    pub fn from_subnet(address: &str, netmask: &str) -> Result<Self> {
        let (start, end) = ipv4::subnet_to_block(address, netmask)?;
        let range = IpRange {
            start: u128::from(start),
            end: u128::from(end),
            family: Family::V4,
        };
        trace!("range {} from {:?}/{:?}", range, address, netmask);
        Ok(range)
    }

    pub fn from_spec(spec: &RangeSpec) -> Result<Self> {
        match spec {
            RangeSpec::Block(s) => s.parse(),
            RangeSpec::Pair(start, end) => Self::new(start, end),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn start(&self) -> u128 {
        self.start
    }

    pub fn end(&self) -> u128 {
        self.end
    }

    pub fn first(&self) -> String {
        self.family.render(self.start)
    }

    pub fn last(&self) -> String {
        self.family.render(self.end)
    }

    /// Number of addresses; `::/0` holds 2^128 of them.
    pub fn len(&self) -> BigUint {
        BigUint::from(self.end - self.start) + 1u32
    }

    /// Always `false`: a range holds at least its start address.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `addr` lies in the range. Text that does not parse is never
    /// contained; use [`IpRange::try_contains`] to see the error.
    pub fn contains<A: ToAddress>(&self, addr: A) -> bool {
        match addr.to_address() {
            Ok(addr) => self.contains_address(addr),
            Err(err) => {
                debug!("query against {} not contained: {}", self, err);
                false
            }
        }
    }

    pub fn try_contains<A: ToAddress>(&self, addr: A) -> Result<bool> {
        Ok(self.contains_address(addr.to_address()?))
    }

    /// An IPv4-mapped IPv6 address is compared by its IPv4 part against an
    /// IPv4 range; any other address of the other family is not contained.
    pub fn contains_address(&self, addr: Address) -> bool {
        self.offset(addr).is_some()
    }

    /// 0-based position of `addr` in the range.
    pub fn index_of<A: ToAddress>(&self, addr: A) -> Option<u128> {
        self.offset(addr.to_address().ok()?)
    }

    /// Address at `index` without walking the range.
    pub fn get(&self, index: u128) -> Option<String> {
        if index > self.end - self.start {
            return None;
        }
        Some(self.family.render(self.start + index))
    }

    /// Sub-range covering the given 0-based positions, or `None` when they
    /// select no address or run past the end.
    ///
    /// ```
    /// use iptools::IpRange;
    ///
    /// let r = IpRange::new("127.0.0.1", "127.255.255.255").unwrap();
    /// assert_eq!("127.0.0.2-127.255.255.255", r.slice(1..).unwrap().to_string());
    /// assert_eq!("127.0.0.1-127.0.0.2", r.slice(..2).unwrap().to_string());
    /// assert_eq!(None, r.slice(5..5));
    /// ```
    pub fn slice<R: RangeBounds<u128>>(&self, bounds: R) -> Option<IpRange> {
        let last = self.end - self.start;
        let lo = match bounds.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.checked_add(1)?,
            Bound::Unbounded => 0,
        };
        let hi = match bounds.end_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.checked_sub(1)?,
            Bound::Unbounded => last,
        };
        if lo > hi || hi > last {
            return None;
        }
        Some(IpRange {
            start: self.start + lo,
            end: self.start + hi,
            family: self.family,
        })
    }

    /// Ascending addresses from start to end, produced one at a time.
    pub fn iter(&self) -> Iter {
        Iter {
            next: Some(self.start),
            end: self.end,
            family: self.family,
        }
    }

    fn offset(&self, addr: Address) -> Option<u128> {
        let value = if addr.family() == self.family {
            addr.value()
        } else {
            match (self.family, addr.to_mapped_ipv4()) {
                (Family::V4, Some(v4)) => v4.value(),
                _ => return None,
            }
        };
        if self.start <= value && value <= self.end {
            Some(value - self.start)
        } else {
            None
        }
    }
}

impl FromStr for IpRange {
    type Err = Error;

    /// Accepts `start-end`, `address/prefix`, `address/netmask` and a bare
    /// address, tried in that order.
    ///
    /// An IPv4 suffix that fails as a prefix but reads as a netmask is taken
    /// as one. `10.0.0.0/128` is therefore `10.0.0.0/128.0.0.0`, which is
    /// `0.0.0.0-127.255.255.255`, while `10.0.0.0/33` is a range error.
    fn from_str(s: &str) -> Result<Self> {
        if let Some((start, end)) = s.split_once('-') {
            return Self::new(start, end);
        }
        match s.split_once('/') {
            Some((address, mask)) if !address.contains(':') => {
                Self::from_cidr(s).or_else(|err| {
                    if ipv4::validate_netmask(mask) {
                        Self::from_subnet(address, mask)
                    } else {
                        Err(err)
                    }
                })
            }
            _ => Self::from_cidr(s),
        }
    }
}

impl TryFrom<RangeSpec> for IpRange {
    type Error = Error;
    fn try_from(spec: RangeSpec) -> Result<Self> {
        Self::from_spec(&spec)
    }
}

impl Display for IpRange {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.first())
        } else {
            write!(f, "{}-{}", self.first(), self.last())
        }
    }
}

impl<'a> IntoIterator for &'a IpRange {
    type Item = String;
    type IntoIter = Iter;
    fn into_iter(self) -> Iter {
        self.iter()
    }
}

/// Iterator over the addresses of an [`IpRange`].
#[derive(Clone, Debug)]
pub struct Iter {
    next: Option<u128>,
    end: u128,
    family: Family,
}

impl Iterator for Iter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let current = self.next?;
        self.next = if current < self.end {
            Some(current + 1)
        } else {
            None
        };
        Some(self.family.render(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|n| usize::try_from(self.end - n).ok().and_then(|r| r.checked_add(1)));
        match remaining {
            None => (0, Some(0)),
            Some(Some(r)) => (r, Some(r)),
            Some(None) => (usize::MAX, None),
        }
    }

    fn nth(&mut self, n: usize) -> Option<String> {
        let current = self.next?;
        match current.checked_add(n as u128) {
            Some(target) if target <= self.end => {
                self.next = Some(target);
                self.next()
            }
            _ => {
                self.next = None;
                None
            }
        }
    }

    fn last(self) -> Option<String> {
        self.next.map(|_| self.family.render(self.end))
    }
}

impl FusedIterator for Iter {}
