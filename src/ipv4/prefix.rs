//! IPv4 address block: an address combined with a netmask.

use std::{cmp::Ordering, fmt};

#[cfg(feature = "ipnet")]
use ipnet::Ipv4Net;

use super::{Hosts, Ipv4Address, Netmask, Stride, Subnets};
use crate::{Ipv4Error, Prefix};

/// An IPv4 prefix (block). The address never has bits set outside of the netmask.
///
/// Prefixes are ordered nesting-aware: if one prefix contains the other, the more specific one
/// comes first. Otherwise, they are ordered by address.
///
/// ```
/// # use cidr_tree::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let block: Ipv4Prefix = "10.0.0.0/24".parse()?;
/// assert!(block.contains(&"10.0.0.128/25".parse()?));
/// assert_eq!(block.broadcast(), "10.0.0.255".parse::<Ipv4Address>()?);
/// assert_eq!(block.checked_add(1)?, "10.0.1.0/24".parse::<Ipv4Prefix>()?);
/// assert!("10.0.0.1/24".parse::<Ipv4Prefix>().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Prefix {
    address: Ipv4Address,
    netmask: Netmask,
}

impl Ipv4Prefix {
    /// Combine `address` and `netmask`. Fails if `address` has bits set outside of the netmask.
    pub fn new(address: Ipv4Address, netmask: Netmask) -> Result<Self, Ipv4Error> {
        if address.0 & netmask.hostmask() != 0 {
            return Err(Ipv4Error::InvalidPrefix { address, netmask });
        }
        Ok(Self { address, netmask })
    }

    /// Combine `address` with the netmask of length `len`.
    pub fn from_len(address: Ipv4Address, len: u8) -> Result<Self, Ipv4Error> {
        Self::new(address, Netmask::from_prefix_len(len)?)
    }

    /// The `/32` prefix of a single address.
    pub const fn host(address: Ipv4Address) -> Self {
        Self {
            address,
            netmask: Netmask::HOST,
        }
    }

    /// `address` must already be aligned to `netmask`.
    pub(crate) const fn aligned(address: Ipv4Address, netmask: Netmask) -> Self {
        Self { address, netmask }
    }

    /// The network address of the block.
    pub const fn address(&self) -> Ipv4Address {
        self.address
    }

    /// The netmask of the block.
    pub const fn netmask(&self) -> Netmask {
        self.netmask
    }

    /// The length of the netmask.
    pub const fn prefix_len(&self) -> u8 {
        self.netmask.prefix_len()
    }

    /// Number of addresses in the block.
    pub const fn size(&self) -> u64 {
        self.netmask.netsize()
    }

    /// Whether the block is a single `/32` address.
    pub const fn is_host(&self) -> bool {
        self.netmask.bits() == u32::MAX
    }

    /// The first address of the block.
    pub const fn network(&self) -> Ipv4Address {
        self.address
    }

    /// The last address of the block.
    pub const fn broadcast(&self) -> Ipv4Address {
        Ipv4Address(self.address.0 | self.netmask.hostmask())
    }

    /// Whether `other` lies inside this block and is more specific. A prefix never contains
    /// itself.
    pub fn contains(&self, other: &Ipv4Prefix) -> bool {
        Prefix::strictly_contains(self, other)
    }

    /// Whether the `/32` of `addr` is contained in this block. Like [`Self::contains`], this is
    /// strict, so a `/32` block does not contain its own address.
    pub fn contains_address(&self, addr: Ipv4Address) -> bool {
        self.contains(&Self::host(addr))
    }

    /// Move the block by `n` times its own size, keeping the netmask.
    pub fn checked_add(&self, n: i64) -> Result<Self, Ipv4Error> {
        self.shift(i128::from(n), n)
    }

    /// Move the block by `-n` times its own size, keeping the netmask.
    pub fn checked_sub(&self, n: i64) -> Result<Self, Ipv4Error> {
        self.shift(-i128::from(n), n.wrapping_neg())
    }

    fn shift(&self, n: i128, reported: i64) -> Result<Self, Ipv4Error> {
        let moved = i128::from(self.address.0) + n * i128::from(self.size());
        u32::try_from(moved)
            .map(|addr| Self::aligned(Ipv4Address(addr), self.netmask))
            .map_err(|_| Ipv4Error::Overflow {
                operand: self.to_string(),
                delta: reported,
            })
    }

    /// The `index`-th address of the block. Negative indices count from the end, so `-1` is the
    /// broadcast address.
    pub fn get(&self, index: i64) -> Result<Ipv4Address, Ipv4Error> {
        let len = self.size() as i64;
        let offset = if index < 0 { index + len } else { index };
        if !(0..len).contains(&offset) {
            return Err(Ipv4Error::IndexOutOfRange {
                index,
                prefix: *self,
            });
        }
        Ok(Ipv4Address(self.address.0 + offset as u32))
    }

    /// Host prefixes selected by an index slice `[start:stop:step]`. Bounds follow the usual
    /// slice semantics: negative bounds count from the end, bounds are clamped to the block, and
    /// missing bounds default to the whole block in the direction of `step`.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let block: Ipv4Prefix = "10.0.0.0/29".parse()?;
    /// let last_two: Vec<String> = block.slice(Some(-2), None, None)?.map(|p| p.to_string()).collect();
    /// assert_eq!(last_two, ["10.0.0.6/32", "10.0.0.7/32"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn slice(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<Stride, Ipv4Error> {
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(Ipv4Error::ZeroStep);
        }
        let len = self.size() as i64;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
        let clamp = |bound: i64| {
            if bound < 0 {
                bound.saturating_add(len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = start.map_or(if step > 0 { lower } else { upper }, clamp);
        let stop = stop.map_or(if step > 0 { upper } else { lower }, clamp);
        let base = i64::from(self.address.0);
        Ok(Stride::new(base + start, base + stop, step))
    }

    /// Host prefixes from `start` (inclusive) to `stop` (exclusive) in steps of `step`, restricted
    /// to the addresses of this block.
    pub fn slice_addrs(
        &self,
        start: Ipv4Address,
        stop: Ipv4Address,
        step: i64,
    ) -> Result<Stride, Ipv4Error> {
        if step == 0 {
            return Err(Ipv4Error::ZeroStep);
        }
        let first = i64::from(self.network().0);
        let last = i64::from(self.broadcast().0);
        let (start, stop) = (i64::from(start.0), i64::from(stop.0));
        let (start, stop) = if step > 0 {
            (start.max(first), stop.min(last + 1))
        } else {
            (start.min(last), stop.max(first - 1))
        };
        Ok(Stride::new(start, stop, step))
    }

    /// Split the block into subnets with the given `netmask`, in increasing-address order. The
    /// netmask must be at least as specific as the block's own.
    ///
    /// ```
    /// # use cidr_tree::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let block: Ipv4Prefix = "10.0.0.0/24".parse()?;
    /// let quarters: Vec<String> = block
    ///     .subnets(Netmask::from_prefix_len(26)?)?
    ///     .map(|p| p.to_string())
    ///     .collect();
    /// assert_eq!(quarters, ["10.0.0.0/26", "10.0.0.64/26", "10.0.0.128/26", "10.0.0.192/26"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subnets(&self, netmask: Netmask) -> Result<Subnets, Ipv4Error> {
        if netmask.prefix_len() < self.prefix_len() {
            return Err(Ipv4Error::SubnetTooLarge {
                prefix: *self,
                netmask,
            });
        }
        Ok(Subnets::new(self, netmask))
    }

    /// Every address of the block as a `/32` prefix.
    pub fn addrs(&self) -> Subnets {
        Subnets::new(self, Netmask::HOST)
    }

    /// Every address of the block except the network and the broadcast address.
    pub fn hosts(&self) -> Hosts {
        let usable = usize::try_from(self.size().saturating_sub(2)).unwrap_or(usize::MAX);
        self.addrs().skip(1).take(usable)
    }
}

impl Prefix for Ipv4Prefix {
    type R = u32;

    fn repr(&self) -> u32 {
        self.address.0
    }

    fn prefix_len(&self) -> u8 {
        self.netmask.prefix_len()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        let netmask = Netmask::from_prefix_len(len.min(32)).unwrap_or(Netmask::HOST);
        Self::aligned(Ipv4Address(repr & netmask.bits()), netmask)
    }

    fn mask(&self) -> u32 {
        self.address.0
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl From<Ipv4Address> for Ipv4Prefix {
    fn from(address: Ipv4Address) -> Self {
        Self::host(address)
    }
}

#[cfg(feature = "ipnet")]
impl From<Ipv4Prefix> for Ipv4Net {
    fn from(prefix: Ipv4Prefix) -> Self {
        <Ipv4Net as Prefix>::from_repr_len(prefix.address.0, prefix.prefix_len())
    }
}

#[cfg(feature = "ipnet")]
impl TryFrom<Ipv4Net> for Ipv4Prefix {
    type Error = Ipv4Error;

    fn try_from(net: Ipv4Net) -> Result<Self, Self::Error> {
        Self::from_len(net.addr().into(), net.prefix_len())
    }
}

impl PartialOrd for Ipv4Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ipv4Prefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nesting_cmp(other)
    }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len())
    }
}

impl fmt::Debug for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
