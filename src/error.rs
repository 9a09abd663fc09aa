//! Error types of the value types and of the prefix tree.

use thiserror::Error;

use crate::ipv4::{Ipv4Address, Ipv4Prefix, Netmask};

/// Errors raised while parsing or computing with addresses, netmasks and prefixes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ipv4Error {
    /// The text is not a valid address, netmask or prefix.
    #[error("unparseable IPv4 object {input:?}: {reason}")]
    Parse {
        /// The rejected input.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// An address was given together with a netmask where only an address is allowed.
    #[error("{0:?} contains a netmask, expected a plain address")]
    UnexpectedNetmask(String),

    /// The integer does not fit into 32 bits.
    #[error("invalid integer IPv4 number {0} (out of range)")]
    OutOfRange(i128),

    /// Address or prefix arithmetic left the address space.
    #[error("cannot shift {operand} by {delta}: result out of range")]
    Overflow {
        /// The original operand, formatted.
        operand: String,
        /// The requested (unscaled) delta.
        delta: i64,
    },

    /// The integer is not one of the 33 legal netmask bit patterns.
    #[error("integer {0} is not a valid netmask")]
    InvalidNetmask(u64),

    /// The address has bits set outside of its netmask.
    #[error("network bits overflow prefix length in {address}/{netmask}")]
    InvalidPrefix {
        /// The offending address.
        address: Ipv4Address,
        /// The netmask it was combined with.
        netmask: Netmask,
    },

    /// Index outside of the block.
    #[error("index {index} out of range for {prefix}")]
    IndexOutOfRange {
        /// The requested index.
        index: i64,
        /// The indexed block.
        prefix: Ipv4Prefix,
    },

    /// Slices need a step different from zero.
    #[error("slice step cannot be zero")]
    ZeroStep,

    /// Subnetting with a mask that is less specific than the block itself.
    #[error("cannot split {prefix} into subnets of size /{}", netmask.prefix_len())]
    SubnetTooLarge {
        /// The block that was split.
        prefix: Ipv4Prefix,
        /// The requested subnet mask.
        netmask: Netmask,
    },
}

/// Errors raised by structural operations on a [`crate::PrefixTree`]. None of these leave the tree
/// in a modified state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError<P> {
    /// A node with the same prefix already exists.
    #[error("duplicate prefix: {0:?}")]
    DuplicatePrefix(P),

    /// The root of a tree cannot be pruned.
    #[error("cannot prune the root of the tree ({0:?})")]
    RootRemoval(P),

    /// The prefix lies outside of the node the operation was called on.
    #[error("this node ({node:?}) does not contain {prefix:?}")]
    NotContained {
        /// Prefix of the node the operation was called on.
        node: P,
        /// The prefix that is not contained.
        prefix: P,
    },

    /// Renumbering onto a prefix that is more specific than the moved subtree.
    #[error("cannot renumber to a prefix with more bits (/{to}) than the node itself (/{from})")]
    StricterMask {
        /// Prefix length of the moved node.
        from: u8,
        /// Prefix length of the renumber target.
        to: u8,
    },

    /// No node with the given prefix exists.
    #[error("prefix not found: {0:?}")]
    NotFound(P),
}
