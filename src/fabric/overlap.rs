//! Overlapping network block detection.
//!
//! Peered networks must not share addresses: a route to the peer's block
//! would shadow local addresses.

use crate::models::{Ipv4, NetworkSpace, TopologyError};
use itertools::Itertools;

/// Two networks whose address blocks intersect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapConflict {
    pub first: String,
    pub second: String,
    /// The smaller of the two blocks, which lies inside the other.
    pub block: Ipv4,
}

/// Find every pair of networks with overlapping blocks, sorted by block.
pub fn find_overlapping_networks(networks: &[NetworkSpace]) -> Vec<OverlapConflict> {
    let mut conflicts: Vec<OverlapConflict> = networks
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.cidr.overlaps(&b.cidr))
        .map(|(a, b)| OverlapConflict {
            first: a.name.clone(),
            second: b.name.clone(),
            // CIDR blocks either nest or are disjoint
            block: if a.cidr.mask >= b.cidr.mask { a.cidr } else { b.cidr },
        })
        .collect();
    conflicts.sort_by_key(|c| c.block);
    conflicts
}

/// Log overlapping networks as warnings.
pub fn log_overlapping_networks(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping network blocks found.");
        return;
    }
    log::warn!("Found {} overlapping network block(s):", conflicts.len());
    for conflict in conflicts {
        log::warn!(
            "  '{}' and '{}' overlap on {}",
            conflict.first,
            conflict.second,
            conflict.block
        );
    }
}

/// Fail on the first overlap. Also checks every subnet stays inside its own
/// network, so subnet ranges are disjoint across networks too.
pub fn check_disjoint(networks: &[NetworkSpace]) -> Result<(), TopologyError> {
    let conflicts = find_overlapping_networks(networks);
    log_overlapping_networks(&conflicts);
    if let Some(c) = conflicts.into_iter().next() {
        return Err(TopologyError::OverlappingNetworks {
            first: c.first,
            second: c.second,
            block: c.block.to_string(),
        });
    }
    for network in networks {
        if let Some(stray) = network
            .subnets
            .iter()
            .find(|s| !network.cidr.contains_block(&s.cidr))
        {
            return Err(TopologyError::AddressSpaceExhausted {
                network: network.name.clone(),
                block: network.cidr.to_string(),
                mask: stray.cidr.mask,
            });
        }
    }
    Ok(())
}
