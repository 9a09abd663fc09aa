//! Description of the generic type `Prefix`.

use std::{cmp::Ordering, fmt::Debug, hash::Hash};

#[cfg(feature = "ipnet")]
use ipnet::Ipv4Net;
use num_traits::{CheckedShr, PrimInt, Unsigned, Zero};

/// Trait for defining prefixes that can be stored in a [`crate::PrefixTree`].
pub trait Prefix: Sized + Clone + Debug {
    /// How can the prefix be represented. This must be one of `u8`, `u16`, `u32`, `u64`, or `u128`.
    type R: Unsigned + PrimInt + Zero + CheckedShr + Hash + Debug;

    /// Get raw representation of the address, ignoring the prefix length. This function must return
    /// the representation with the mask already applied.
    fn repr(&self) -> Self::R;

    /// Prefix length
    fn prefix_len(&self) -> u8;

    /// Create a new prefix from the representation and the prefix pength. Bits outside of the
    /// prefix length are cleared.
    fn from_repr_len(repr: Self::R, len: u8) -> Self;

    /// mask `self.repr()` using `self.len()`. If you can guarantee that `repr` is already masked,
    /// them simply re-implement this function for your type.
    fn mask(&self) -> Self::R {
        self.repr() & mask_from_prefix_len(self.prefix_len())
    }

    /// Create a prefix that matches everything
    fn zero() -> Self {
        Self::from_repr_len(Self::R::zero(), 0)
    }

    /// Number of bits in the representation.
    fn max_len() -> u8 {
        Self::R::zero().count_zeros() as u8
    }

    /// Whether the prefix names a single address and can therefore never contain another prefix.
    fn is_host(&self) -> bool {
        self.prefix_len() == Self::max_len()
    }

    /// Check if `self` contains `other` in its prefix range. This function also returns `True` if
    /// `self` is identical to `other`.
    fn contains(&self, other: &Self) -> bool {
        if self.prefix_len() > other.prefix_len() {
            return false;
        }
        other.repr() & mask_from_prefix_len(self.prefix_len()) == self.mask()
    }

    /// Check if `other` lies inside `self` and is more specific. A prefix never strictly contains
    /// itself, and a host prefix never strictly contains anything.
    fn strictly_contains(&self, other: &Self) -> bool {
        self.prefix_len() < other.prefix_len() && self.contains(other)
    }

    /// Compare two prefixes together
    fn eq(&self, other: &Self) -> bool {
        self.mask() == other.mask() && self.prefix_len() == other.prefix_len()
    }

    /// Nesting-aware ordering. If one prefix contains the other, the more specific one comes
    /// first (and equal lengths fall back to the address). Otherwise, prefixes are ordered by
    /// their address.
    fn nesting_cmp(&self, other: &Self) -> Ordering {
        if self.contains(other) || other.contains(self) {
            other
                .prefix_len()
                .cmp(&self.prefix_len())
                .then_with(|| self.mask().cmp(&other.mask()))
        } else {
            self.mask().cmp(&other.mask())
        }
    }

    /// Replace the bits covered by `onto`'s prefix length with the network bits of `onto`. All
    /// remaining bits and the prefix length of `self` are kept.
    fn renumbered(&self, onto: &Self) -> Self {
        let keep = !mask_from_prefix_len::<Self::R>(onto.prefix_len());
        Self::from_repr_len(onto.mask() | (self.mask() & keep), self.prefix_len())
    }
}

pub(crate) fn mask_from_prefix_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 == R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

#[cfg(feature = "ipnet")]
impl Prefix for Ipv4Net {
    type R = u32;

    fn repr(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        Ipv4Net::new(repr.into(), len.min(32))
            .map(|net| net.trunc())
            .unwrap_or_default()
    }

    fn eq(&self, other: &Self) -> bool {
        self.trunc() == other.trunc()
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }

    fn zero() -> Self {
        Default::default()
    }

    fn contains(&self, other: &Self) -> bool {
        self.contains(other)
    }
}

impl<R> Prefix for (R, u8)
where
    R: Unsigned + PrimInt + Zero + CheckedShr + Hash + Debug,
{
    type R = R;

    fn repr(&self) -> R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: R, len: u8) -> Self {
        (repr & mask_from_prefix_len(len), len)
    }

    fn eq(&self, other: &Self) -> bool {
        self.mask() == other.mask() && self.1 == other.1
    }
}
