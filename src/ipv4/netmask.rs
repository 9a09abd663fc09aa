//! IPv4 netmask, restricted to the 33 contiguous bit patterns.

use std::{fmt, net::Ipv4Addr};

use crate::Ipv4Error;

/// An IPv4 netmask: a run of `0..=32` leading one-bits followed by zeros. Any other bit pattern
/// is rejected on construction.
///
/// ```
/// # use cidr_tree::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mask: Netmask = "255.255.255.0".parse()?;
/// assert_eq!(mask.prefix_len(), 24);
/// assert_eq!(mask.netsize(), 256);
/// assert_eq!(Netmask::from_int(24)?, mask);
/// assert!(Netmask::from_bits(0xffff00ff).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Netmask(u32);

const fn bits_from_len(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - len as u32)
    }
}

impl Netmask {
    /// `/32`, the netmask of a single host.
    pub const HOST: Self = Self(u32::MAX);
    /// `/0`, the netmask of the whole address space.
    pub const ANY: Self = Self(0);

    /// Netmask from a prefix length in `0..=32`.
    pub fn from_prefix_len(len: u8) -> Result<Self, Ipv4Error> {
        if len > 32 {
            return Err(Ipv4Error::InvalidNetmask(len.into()));
        }
        Ok(Self(bits_from_len(len)))
    }

    /// Netmask from its raw bit pattern, which must be one of the 33 legal values.
    pub fn from_bits(bits: u32) -> Result<Self, Ipv4Error> {
        if Self::is_legal(bits) {
            Ok(Self(bits))
        } else {
            Err(Ipv4Error::InvalidNetmask(bits.into()))
        }
    }

    /// Netmask from an integer. Values in `0..=32` are taken as prefix lengths, all others as raw
    /// bit patterns. Both readings agree on `0`, and no legal bit pattern lies in `1..=32`.
    pub fn from_int(value: u64) -> Result<Self, Ipv4Error> {
        match u8::try_from(value) {
            Ok(len) if len <= 32 => Self::from_prefix_len(len),
            _ => u32::try_from(value)
                .map_err(|_| Ipv4Error::InvalidNetmask(value))
                .and_then(Self::from_bits),
        }
    }

    /// Netmask of a block holding `netsize` addresses. `netsize` must be a power of two in
    /// `1..=2^32`.
    pub fn by_netsize(netsize: u64) -> Result<Self, Ipv4Error> {
        if !netsize.is_power_of_two() || netsize > 1 << 32 {
            return Err(Ipv4Error::InvalidNetmask(netsize));
        }
        Self::from_prefix_len(32 - netsize.trailing_zeros() as u8)
    }

    /// Whether `bits` is one of the 33 legal netmask values.
    pub const fn is_legal(bits: u32) -> bool {
        bits.leading_ones() + bits.trailing_zeros() == 32
    }

    /// All 33 netmasks, from `/0` to `/32`.
    pub fn all() -> impl Iterator<Item = Self> + Clone {
        (0..=32).map(|len| Self(bits_from_len(len)))
    }

    /// The raw bit pattern.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The bits not covered by the mask.
    pub const fn hostmask(self) -> u32 {
        !self.0
    }

    /// The netmask in slash notation.
    pub const fn prefix_len(self) -> u8 {
        self.0.leading_ones() as u8
    }

    /// Number of addresses in a block with this netmask.
    pub const fn netsize(self) -> u64 {
        1 << (32 - self.prefix_len() as u32)
    }
}

impl TryFrom<u32> for Netmask {
    type Error = Ipv4Error;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<Netmask> for u32 {
    fn from(mask: Netmask) -> Self {
        mask.0
    }
}

impl fmt::Display for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Ipv4Addr::from(self.0), f)
    }
}

impl fmt::Debug for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn legal_values() {
        let all: Vec<u32> = Netmask::all().map(Netmask::bits).collect();
        assert_eq!(all.len(), 33);
        assert_eq!(all[0], 0);
        assert_eq!(all[8], 0xff000000);
        assert_eq!(all[31], 0xfffffffe);
        assert_eq!(all[32], u32::MAX);
        assert!(all.iter().all(|m| Netmask::is_legal(*m)));
        assert!(!Netmask::is_legal(0x00ffffff));
        assert!(!Netmask::is_legal(0xfffffffd));
        assert!(!Netmask::is_legal(1));
    }

    #[test]
    fn length_round_trip() {
        for mask in Netmask::all() {
            let len = mask.prefix_len();
            assert_eq!(Netmask::from_prefix_len(len).unwrap().bits(), mask.bits());
            assert_eq!(Netmask::from_bits(mask.bits()).unwrap().prefix_len(), len);
        }
    }

    #[test]
    fn from_int() {
        assert_eq!(Netmask::from_int(0).unwrap(), Netmask::ANY);
        assert_eq!(Netmask::from_int(32).unwrap(), Netmask::HOST);
        assert_eq!(Netmask::from_int(24).unwrap().bits(), 0xffffff00);
        assert_eq!(Netmask::from_int(0xffffff00).unwrap().prefix_len(), 24);
        assert_eq!(Netmask::from_int(33), Err(Ipv4Error::InvalidNetmask(33)));
        assert_eq!(
            Netmask::from_int(0xffff00ff),
            Err(Ipv4Error::InvalidNetmask(0xffff00ff))
        );
        assert!(Netmask::from_int(1 << 40).is_err());
        assert!(Netmask::from_prefix_len(33).is_err());
    }

    #[test]
    fn netsize() {
        assert_eq!(Netmask::HOST.netsize(), 1);
        assert_eq!(Netmask::ANY.netsize(), 1 << 32);
        assert_eq!(Netmask::from_prefix_len(30).unwrap().netsize(), 4);
        assert_eq!(Netmask::by_netsize(4).unwrap().prefix_len(), 30);
        assert_eq!(Netmask::by_netsize(1 << 32).unwrap(), Netmask::ANY);
        assert!(Netmask::by_netsize(3).is_err());
        assert!(Netmask::by_netsize(0).is_err());
        assert!(Netmask::by_netsize(1 << 33).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Netmask::from_prefix_len(20).unwrap().to_string(), "255.255.240.0");
        assert_eq!(Netmask::from_prefix_len(20).unwrap().hostmask(), 0x00000fff);
    }
}
