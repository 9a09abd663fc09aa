//! Text parsing of addresses, netmasks and prefixes.
//!
//! Three forms are understood: `a.b.c.d`, `a.b.c.d/n` with `n` in `0..=32`, and
//! `a.b.c.d/m.m.m.m` where `m.m.m.m` is a legal netmask. Octets are one to three decimal digits
//! with a value of at most 255.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    str::FromStr,
};

use log::debug;

use crate::{Ipv4Address, Ipv4Error, Ipv4Prefix, Netmask};

/// Number of entries a [`Parser`] keeps by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

fn parse_error(input: &str, reason: &'static str) -> Ipv4Error {
    Ipv4Error::Parse {
        input: input.to_string(),
        reason,
    }
}

fn parse_quad(quad: &str, input: &str) -> Result<u32, Ipv4Error> {
    let mut value = 0u32;
    let mut parts = 0;
    for part in quad.split('.') {
        parts += 1;
        if parts > 4 {
            return Err(parse_error(input, "too many dot-separated parts"));
        }
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(parse_error(input, "non-digit dot-separated part"));
        }
        let octet: u32 = part
            .parse()
            .map_err(|_| parse_error(input, "non-digit dot-separated part"))?;
        if octet > 255 {
            return Err(parse_error(input, "octet out of range"));
        }
        value = (value << 8) | octet;
    }
    if parts != 4 {
        return Err(parse_error(input, "too few dot-separated parts"));
    }
    Ok(value)
}

/// Parse `s` into the integer value of its address and, if present, of its netmask. The netmask
/// is always one of the 33 legal bit patterns.
///
/// ```
/// # use cidr_tree::parse::parse_parts;
/// assert_eq!(parse_parts("10.0.0.1"), Ok((0x0a000001, None)));
/// assert_eq!(parse_parts("10.0.0.0/8"), Ok((0x0a000000, Some(0xff000000))));
/// assert_eq!(parse_parts("10.0.0.0/255.255.0.0"), Ok((0x0a000000, Some(0xffff0000))));
/// assert!(parse_parts("10.0.0.256").is_err());
/// ```
pub fn parse_parts(s: &str) -> Result<(u32, Option<u32>), Ipv4Error> {
    let Some((addr, mask)) = s.split_once('/') else {
        return Ok((parse_quad(s, s)?, None));
    };
    let mask = if mask.contains('.') {
        let bits = parse_quad(mask, s)?;
        Netmask::from_bits(bits)?.bits()
    } else {
        if mask.is_empty() || mask.len() > 2 || !mask.bytes().all(|b| b.is_ascii_digit()) {
            return Err(parse_error(s, "invalid prefix length"));
        }
        let len: u8 = mask
            .parse()
            .map_err(|_| parse_error(s, "invalid prefix length"))?;
        if len > 32 {
            return Err(parse_error(s, "prefix length out of range"));
        }
        Netmask::from_prefix_len(len)?.bits()
    };
    Ok((parse_quad(addr, s)?, Some(mask)))
}

impl FromStr for Ipv4Address {
    type Err = Ipv4Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_parts(s)? {
            (addr, None) => Ok(Self::new(addr)),
            (_, Some(_)) => Err(Ipv4Error::UnexpectedNetmask(s.to_string())),
        }
    }
}

impl FromStr for Netmask {
    type Err = Ipv4Error;

    /// Accepts the dotted form (`255.255.255.0`) and the length form, with or without a leading
    /// slash (`/24` or `24`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.strip_prefix('/').unwrap_or(s);
        if len.contains('.') {
            return Netmask::from_bits(parse_quad(len, s)?);
        }
        let (_, mask) = parse_parts(&format!("0.0.0.0/{len}")).map_err(|e| match e {
            Ipv4Error::Parse { reason, .. } => parse_error(s, reason),
            e => e,
        })?;
        Netmask::from_bits(mask.unwrap_or_default())
    }
}

impl FromStr for Ipv4Prefix {
    type Err = Ipv4Error;

    /// A bare address is read as a `/32` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, mask) = parse_parts(s)?;
        let netmask = match mask {
            Some(bits) => Netmask::from_bits(bits)?,
            None => Netmask::HOST,
        };
        Ipv4Prefix::new(Ipv4Address::new(addr), netmask)
    }
}

/// Either an address or a prefix, depending on whether the text carried a netmask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ipv4Object {
    /// Plain address text (`a.b.c.d`).
    Address(Ipv4Address),
    /// Address text with a netmask (`a.b.c.d/n` or `a.b.c.d/m.m.m.m`).
    Prefix(Ipv4Prefix),
}

impl Ipv4Object {
    /// The object as a prefix. Addresses become `/32` prefixes.
    pub fn to_prefix(self) -> Ipv4Prefix {
        match self {
            Ipv4Object::Address(addr) => Ipv4Prefix::host(addr),
            Ipv4Object::Prefix(prefix) => prefix,
        }
    }
}

impl fmt::Display for Ipv4Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ipv4Object::Address(addr) => fmt::Display::fmt(addr, f),
            Ipv4Object::Prefix(prefix) => fmt::Display::fmt(prefix, f),
        }
    }
}

/// A parser that remembers its most recent results.
///
/// The cache holds at most `capacity` entries. Once full, the entry that was added first is
/// evicted (first-in, first-out), regardless of how often it was hit since. Failed parses are
/// never cached.
///
/// ```
/// # use cidr_tree::{parse::Parser, Ipv4Prefix};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut parser = Parser::with_capacity(2);
/// let p: Ipv4Prefix = parser.parse_prefix("10.0.0.0/8")?;
/// assert_eq!(p, "10.0.0.0/8".parse::<Ipv4Prefix>()?);
/// parser.parse("10.0.0.1")?;
/// parser.parse("10.0.0.2")?;
/// assert_eq!(parser.len(), 2);
/// assert!(!parser.is_cached("10.0.0.0/8"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Parser {
    capacity: usize,
    entries: HashMap<String, (Ipv4Address, Option<Netmask>)>,
    order: VecDeque<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl Parser {
    /// Create a parser with a cache of [`DEFAULT_CACHE_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser whose cache holds at most `capacity` entries. A capacity of zero disables
    /// caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Parse `s` into an address and an optional netmask.
    pub fn parse(&mut self, s: &str) -> Result<(Ipv4Address, Option<Netmask>), Ipv4Error> {
        if let Some(hit) = self.entries.get(s) {
            return Ok(*hit);
        }
        let (addr, mask) = parse_parts(s)?;
        let parsed = (Ipv4Address::new(addr), mask.map(Netmask::from_bits).transpose()?);
        self.remember(s, parsed);
        Ok(parsed)
    }

    /// Parse `s` as a plain address. Text carrying a netmask is rejected.
    pub fn parse_address(&mut self, s: &str) -> Result<Ipv4Address, Ipv4Error> {
        match self.parse(s)? {
            (addr, None) => Ok(addr),
            (_, Some(_)) => Err(Ipv4Error::UnexpectedNetmask(s.to_string())),
        }
    }

    /// Parse `s` as a prefix. A bare address is read as a `/32` prefix.
    pub fn parse_prefix(&mut self, s: &str) -> Result<Ipv4Prefix, Ipv4Error> {
        let (addr, mask) = self.parse(s)?;
        Ipv4Prefix::new(addr, mask.unwrap_or(Netmask::HOST))
    }

    /// Parse `s` into either an address or a prefix.
    pub fn parse_object(&mut self, s: &str) -> Result<Ipv4Object, Ipv4Error> {
        match self.parse(s)? {
            (addr, None) => Ok(Ipv4Object::Address(addr)),
            (addr, Some(mask)) => Ipv4Prefix::new(addr, mask).map(Ipv4Object::Prefix),
        }
    }

    /// Whether the result for `s` is currently cached.
    pub fn is_cached(&self, s: &str) -> bool {
        self.entries.contains_key(s)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all cached entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn remember(&mut self, s: &str, parsed: (Ipv4Address, Option<Netmask>)) {
        if self.capacity == 0 {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("parser cache full, evicting {oldest:?}");
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(s.to_string());
        self.entries.insert(s.to_string(), parsed);
    }
}
