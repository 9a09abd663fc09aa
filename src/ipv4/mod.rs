//! IPv4 value types: [`Ipv4Address`], [`Netmask`] and [`Ipv4Prefix`].

mod address;
mod iter;
mod netmask;
mod prefix;

pub use address::Ipv4Address;
pub use iter::{Hosts, Stride, Subnets};
pub use netmask::Netmask;
pub use prefix::Ipv4Prefix;
