//! This crate provides IPv4 value types and a tree that organizes CIDR prefixes by containment.
//!
//! # Values
//!
//! - [`Ipv4Address`] is a single IPv4 address with checked integer arithmetic.
//! - [`Netmask`] is a contiguous IPv4 netmask. It can be built from a prefix length, from its bit
//!   pattern, or from the number of addresses a block should hold.
//! - [`Ipv4Prefix`] is an address together with a netmask, where all host bits of the address are
//!   zero. A prefix behaves like a sequence of addresses: it can be indexed, sliced, and split into
//!   subnets.
//!
//! All three types can be parsed from text. The [`parse::Parser`] additionally remembers recent
//! inputs in a bounded cache.
//!
//! # The tree
//!
//! A [`PrefixTree`] has a fixed root prefix. Every inserted prefix is placed below the most
//! specific node that strictly contains it, and existing nodes that the new prefix strictly
//! contains are moved below the new node. As a result, the children of every node are disjoint
//! blocks inside their parent, independent of the order in which prefixes were inserted.
//!
//! ```
//! # use cidr_tree::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = PrefixTree::new("0.0.0.0/0".parse::<Ipv4Prefix>()?);
//! for p in ["10.1.0.0/16", "10.0.0.0/8", "192.168.0.0/16", "10.1.2.0/24"] {
//!     tree.insert(p.parse()?)?;
//! }
//! tree.sort();
//! assert_eq!(
//!     tree.to_string(),
//!     "0.0.0.0/0\n    10.0.0.0/8\n        10.1.0.0/16\n            10.1.2.0/24\n    192.168.0.0/16\n",
//! );
//!
//! // the most specific node containing an address
//! let addr: Ipv4Prefix = "10.1.2.3".parse()?;
//! assert_eq!(tree.find_loose(&addr).unwrap().prefix().to_string(), "10.1.2.0/24");
//! # Ok(())
//! # }
//! ```
//!
//! Besides inserting and searching, the tree supports pruning a subtree (which returns it as a
//! tree of its own), grafting a tree back in, and renumbering a subtree onto a different network.
//! Renumbering either succeeds or leaves the tree exactly as it was.
//!
//! The tree works with any type implementing [`Prefix`]. Besides [`Ipv4Prefix`], this includes
//! `ipnet::Ipv4Net` (with the `ipnet` feature) and tuples `(R, u8)`, where `R` is an unsigned
//! primitive integer.
//!
//! # Traversals
//!
//! [`PrefixTree::dfi`] visits all nodes in pre-order together with their depth.
//! [`PrefixTree::dfi_part`] only descends below nodes accepted by a filter. Both traversals only
//! borrow the tree.
//!
//! | Operation                         | Complexity      |
//! |-----------------------------------|-----------------|
//! | `insert`, `find`, `find_loose`    | `O(d * w)`      |
//! | `prune`, `graft`, `renumber`      | `O(n)`          |
//! | `sort`                            | `O(n log n)`    |
//! | `len`, `root`                     | `O(1)`          |
//!
//! Here, `n` is the number of nodes, `d` the depth of the tree, and `w` the largest number of
//! non-host children of a single node.

#![deny(missing_docs)]

mod error;
mod fmt;
pub mod ipv4;
pub mod parse;
mod prefix;
pub mod tree;

#[cfg(test)]
mod fuzzing;

pub use error::{Ipv4Error, TreeError};
pub use ipv4::{Hosts, Ipv4Address, Ipv4Prefix, Netmask, Stride, Subnets};
pub use parse::{Ipv4Object, Parser};
pub use prefix::Prefix;
pub use tree::{NodeId, NodeRef, PrefixTree};
