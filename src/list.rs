use crate::error::{Error, Result};
use crate::range::{self, IpRange, RangeSpec};
use crate::{Address, ToAddress};
use log::{debug, trace};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Error as FmtError, Formatter};
use std::iter::FromIterator;
use std::slice;

/// Ordered list of ranges answering "is this address allowed?".
///
/// Ranges keep their insertion order and their own family, so IPv4 and IPv6
/// blocks can be mixed. Deserializes from a sequence of specs:
///
/// ```
/// use iptools::IpRangeList;
///
/// let list: IpRangeList =
///     serde_json::from_str(r#"["127.0.0.1", "10/8", ["fe80::1", "fe80::ff"]]"#).unwrap();
/// assert!(list.contains("10.1.2.3"));
/// assert!(list.contains("fe80::10"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<RangeSpec>", into = "Vec<RangeSpec>")]
pub struct IpRangeList {
    ranges: Vec<IpRange>,
}

impl Display for IpRangeList {
    fn fmt(&self, f: &mut Formatter) -> std::result::Result<(), FmtError> {
        for v in self.ranges.iter() {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl IpRangeList {
    pub fn new() -> Self {
        IpRangeList { ranges: Vec::new() }
    }

    /// Builds a list from specs, failing on the first one that does not parse.
    pub fn from_specs<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<RangeSpec>,
    {
        let mut list = IpRangeList::new();
        for spec in specs {
            list.push(spec)?;
        }
        Ok(list)
    }

    /// Normalizes `spec` into a range and appends it. Nothing is appended
    /// when the spec is invalid.
    pub fn push<S: Into<RangeSpec>>(&mut self, spec: S) -> Result<()> {
        let range = IpRange::from_spec(&spec.into())?;
        self.push_range(range);
        Ok(())
    }

    pub fn push_range(&mut self, range: IpRange) {
        trace!("list appends {}", range);
        self.ranges.push(range);
    }

    pub fn ranges(&self) -> &[IpRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of addresses over all ranges, overlaps counted twice.
    pub fn len(&self) -> BigUint {
        self.ranges.iter().map(IpRange::len).sum()
    }

    /// Whether any range holds `addr`. Text that does not parse is never
    /// contained; use [`IpRangeList::try_contains`] to see the error.
    pub fn contains<A: ToAddress>(&self, addr: A) -> bool {
        match addr.to_address() {
            Ok(addr) => self.contains_address(addr),
            Err(err) => {
                debug!("query against list not contained: {}", err);
                false
            }
        }
    }

    pub fn try_contains<A: ToAddress>(&self, addr: A) -> Result<bool> {
        Ok(self.contains_address(addr.to_address()?))
    }

    pub fn contains_address(&self, addr: Address) -> bool {
        self.ranges.iter().any(|r| r.contains_address(addr))
    }

    /// Addresses of every range in insertion order, produced lazily.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ranges: self.ranges.iter(),
            current: None,
        }
    }
}

impl TryFrom<Vec<RangeSpec>> for IpRangeList {
    type Error = Error;
    fn try_from(specs: Vec<RangeSpec>) -> Result<Self> {
        IpRangeList::from_specs(specs)
    }
}

impl From<IpRangeList> for Vec<RangeSpec> {
    fn from(list: IpRangeList) -> Self {
        list.ranges.into_iter().map(RangeSpec::from).collect()
    }
}

impl FromIterator<IpRange> for IpRangeList {
    fn from_iter<T: IntoIterator<Item = IpRange>>(iter: T) -> Self {
        IpRangeList {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl Extend<IpRange> for IpRangeList {
    fn extend<T: IntoIterator<Item = IpRange>>(&mut self, iter: T) {
        for range in iter {
            self.push_range(range);
        }
    }
}

impl<'a> IntoIterator for &'a IpRangeList {
    type Item = String;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over the addresses of an [`IpRangeList`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    ranges: slice::Iter<'a, IpRange>,
    current: Option<range::Iter>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(ip) = self.current.as_mut().and_then(Iterator::next) {
                return Some(ip);
            }
            self.current = Some(self.ranges.next()?.iter());
        }
    }
}
