//! IPv4 address blocks in CIDR notation.
//!
//! Provides [`Ipv4`] for representing a network block, along with the bit
//! arithmetic used to carve subnets out of a VPC block.

use super::TopologyError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use vpc_blueprint::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, TopologyError> {
    if len > MAX_LENGTH {
        return Err(TopologyError::invalid_block(
            format!("/{len}"),
            "network length is too long",
        ));
    }
    let right_len = MAX_LENGTH - len;
    let mask = (u32::MAX as u64 >> right_len) << right_len;
    Ok(mask as u32)
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, TopologyError> {
    Ok(Ipv4Addr::from(u32::from(addr) & get_cidr_mask(len)?))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, TopologyError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Returns the address following the subnet `addr/len`, or `None` when the
/// subnet already ends at 255.255.255.255.
pub fn ip_after_subnet(addr: Ipv4Addr, len: u8) -> Result<Option<Ipv4Addr>, TopologyError> {
    let network_bits = u32::from(cut_addr(addr, len)?) as u64;
    let next = network_bits + (1u64 << (MAX_LENGTH - len));
    Ok(u32::try_from(next).ok().map(Ipv4Addr::from))
}

/// Calculate the next subnet after `ipv4`, sized with `mask` if given.
///
/// Moving to a smaller subnet starts right after the current broadcast
/// address, so nothing inside `ipv4` is handed out twice.
pub fn next_subnet_ipv4(ipv4: Ipv4, mask: Option<u8>) -> Result<Option<Ipv4>, TopologyError> {
    let new_mask = mask.unwrap_or(ipv4.mask);
    let start = if new_mask <= ipv4.mask {
        ipv4.addr
    } else {
        broadcast_addr(ipv4.addr, ipv4.mask)?
    };
    Ok(ip_after_subnet(start, new_mask)?.map(|addr| Ipv4 {
        addr,
        mask: new_mask,
    }))
}

/// IPv4 network block with CIDR notation support.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl Ipv4 {
    /// Parse a CIDR string such as "10.50.0.0/16".
    pub fn new(addr_cidr: &str) -> Result<Ipv4, TopologyError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| TopologyError::invalid_block(addr_cidr, "expected address/mask"))?;
        let addr = Ipv4Addr::from_str(addr).map_err(|_| {
            TopologyError::invalid_block(addr_cidr, format!("invalid address {addr}"))
        })?;
        let mask = u8::from_str(mask)
            .map_err(|_| TopologyError::invalid_block(addr_cidr, format!("invalid mask {mask}")))?;
        if mask > MAX_LENGTH {
            return Err(TopologyError::invalid_block(
                addr_cidr,
                "network length is too long",
            ));
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.netmask())
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.lo()) | !self.netmask())
    }

    /// True when the address has no host bits set.
    pub fn is_network_address(&self) -> bool {
        self.addr == self.lo()
    }

    /// Check if an IP address is contained within this block.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        ip >= self.lo() && ip <= self.hi()
    }

    /// Check if `other` lies completely within this block.
    pub fn contains_block(&self, other: &Ipv4) -> bool {
        self.contains(other.lo()) && self.contains(other.hi())
    }

    /// Check if the two blocks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.mask.min(MAX_LENGTH))
    }

    fn netmask(&self) -> u32 {
        get_cidr_mask(self.mask.min(MAX_LENGTH)).unwrap_or(u32::MAX)
    }
}

impl FromStr for Ipv4 {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
