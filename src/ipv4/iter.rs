//! Lazy sequences over the addresses and subnets of an [`Ipv4Prefix`].

use super::{Ipv4Address, Ipv4Prefix, Netmask};

/// Equally-sized subnets tiling a block in increasing-address order. Created by
/// [`Ipv4Prefix::subnets`] and [`Ipv4Prefix::addrs`]. Cloning the iterator restarts it from the
/// clone's current position.
#[derive(Clone, Debug)]
pub struct Subnets {
    next: u64,
    end: u64,
    netmask: Netmask,
}

impl Subnets {
    pub(crate) fn new(block: &Ipv4Prefix, netmask: Netmask) -> Self {
        let start = u64::from(block.address().value());
        Self {
            next: start,
            end: start + block.size(),
            netmask,
        }
    }
}

impl Iterator for Subnets {
    type Item = Ipv4Prefix;

    fn next(&mut self) -> Option<Ipv4Prefix> {
        if self.next >= self.end {
            return None;
        }
        // `next` is aligned to the netmask and below 2^32
        let subnet = Ipv4Prefix::aligned(Ipv4Address(self.next as u32), self.netmask);
        self.next += self.netmask.netsize();
        Some(subnet)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next.min(self.end)) / self.netmask.netsize();
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Host addresses (as `/32` prefixes) visited by a slice of an [`Ipv4Prefix`]. Created by
/// [`Ipv4Prefix::slice`] and [`Ipv4Prefix::slice_addrs`].
#[derive(Clone, Debug)]
pub struct Stride {
    next: i64,
    stop: i64,
    step: i64,
}

impl Stride {
    /// `next` and `stop` are absolute address values; `stop` is exclusive. Callers clamp both so
    /// that every visited value lies inside the block.
    pub(crate) fn new(next: i64, stop: i64, step: i64) -> Self {
        Self { next, stop, step }
    }

    fn remaining(&self) -> u64 {
        let (distance, step) = if self.step > 0 {
            (i128::from(self.stop) - i128::from(self.next), i128::from(self.step))
        } else {
            (i128::from(self.next) - i128::from(self.stop), -i128::from(self.step))
        };
        if distance <= 0 {
            0
        } else {
            ((distance + step - 1) / step) as u64
        }
    }
}

impl Iterator for Stride {
    type Item = Ipv4Prefix;

    fn next(&mut self) -> Option<Ipv4Prefix> {
        let in_range = if self.step > 0 {
            self.next < self.stop
        } else {
            self.next > self.stop
        };
        if !in_range {
            return None;
        }
        let addr = Ipv4Address(self.next as u32);
        self.next = self.next.saturating_add(self.step);
        Some(Ipv4Prefix::host(addr))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// All addresses of a block except its network and broadcast address.
pub type Hosts = std::iter::Take<std::iter::Skip<Subnets>>;
