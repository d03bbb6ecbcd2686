//! Resolver address derivation.
//!
//! The provider reserves the network base address plus two for its DNS
//! server, so the address is computed from the block rather than configured.

use crate::models::{Ipv4, TopologyError};
use std::net::Ipv4Addr;

/// Offset of the provider DNS server from the block base address.
pub const RESOLVER_OFFSET: u8 = 2;

/// Derive the internal resolver address of a network block.
///
/// Adds [`RESOLVER_OFFSET`] to the fourth octet of the block's base address.
/// Fails with [`TopologyError::InvalidAddressBlock`] when the octet would pass
/// 255, when the prefix leaves fewer than two host bits, or when the result
/// falls outside the block.
pub fn derive_resolver_address(block: &Ipv4) -> Result<Ipv4Addr, TopologyError> {
    let [a, b, c, d] = block.addr.octets();
    let d = d.checked_add(RESOLVER_OFFSET).ok_or_else(|| {
        TopologyError::invalid_block(block, "fourth octet overflows when adding resolver offset")
    })?;
    if block.mask > 30 {
        return Err(TopologyError::invalid_block(
            block,
            format!("/{} leaves no room for a resolver address", block.mask),
        ));
    }
    let resolver = Ipv4Addr::new(a, b, c, d);
    if !block.contains(resolver) {
        return Err(TopologyError::invalid_block(
            block,
            format!("resolver {resolver} falls outside the block"),
        ));
    }
    log::debug!("Resolver address for {block} is {resolver}");
    Ok(resolver)
}
