//! 32-bit IPv4 address value.

use std::{fmt, net::Ipv4Addr};

use crate::Ipv4Error;

/// An IPv4 address, i.e., an integer in `0..=u32::MAX` that is displayed in dotted-quad form.
///
/// ```
/// # use cidr_tree::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let addr: Ipv4Address = "10.0.0.255".parse()?;
/// assert_eq!(addr.checked_add(1)?, "10.0.1.0".parse::<Ipv4Address>()?);
/// assert!(Ipv4Address::MAX.checked_add(1).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ipv4Address(pub(crate) u32);

impl Ipv4Address {
    /// `0.0.0.0`
    pub const MIN: Self = Self(0);
    /// `255.255.255.255`
    pub const MAX: Self = Self(u32::MAX);

    /// Create an address from its integer value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Create an address from its four octets, most significant first.
    pub const fn from_octets(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(u32::from_be_bytes([a, b, c, d]))
    }

    /// The integer value of the address.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The four octets of the address, most significant first.
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Add `n` to the address. Fails if the result leaves the address space.
    pub fn checked_add(self, n: i64) -> Result<Self, Ipv4Error> {
        self.shift(i128::from(n), n)
    }

    /// Subtract `n` from the address. Fails if the result leaves the address space.
    pub fn checked_sub(self, n: i64) -> Result<Self, Ipv4Error> {
        self.shift(-i128::from(n), n.wrapping_neg())
    }

    fn shift(self, delta: i128, reported: i64) -> Result<Self, Ipv4Error> {
        u32::try_from(i128::from(self.0) + delta)
            .map(Self)
            .map_err(|_| Ipv4Error::Overflow {
                operand: self.to_string(),
                delta: reported,
            })
    }
}

impl From<u32> for Ipv4Address {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Ipv4Address> for u32 {
    fn from(addr: Ipv4Address) -> Self {
        addr.0
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr.into())
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        addr.0.into()
    }
}

impl TryFrom<i64> for Ipv4Address {
    type Error = Ipv4Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| Ipv4Error::OutOfRange(value.into()))
    }
}

impl TryFrom<u64> for Ipv4Address {
    type Error = Ipv4Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| Ipv4Error::OutOfRange(value.into()))
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Ipv4Addr::from(self.0), f)
    }
}

impl fmt::Debug for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
