//! Peering links and the route entries that traverse them.

use super::{Ipv4, NetworkTier, SubnetTier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unordered link between two networks.
///
/// The pair is stored in a canonical order so `(a, b)` and `(b, a)` produce
/// the same link and the same handle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeeringLink {
    pub id: String,
    pub first: NetworkTier,
    pub second: NetworkTier,
    /// Provider-style connection handle used as next hop.
    pub handle: String,
}

impl PeeringLink {
    pub fn new(a: NetworkTier, b: NetworkTier) -> PeeringLink {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        PeeringLink {
            id: format!("{second}To{first}Peering"),
            first,
            second,
            handle: format!("pcx-{}-{}", first.short_name(), second.short_name()),
        }
    }

    /// True when the link joins exactly these two networks, in either order.
    pub fn joins(&self, a: NetworkTier, b: NetworkTier) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

impl fmt::Display for PeeringLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {} ({})", self.first, self.second, self.handle)
    }
}

/// Route sending traffic for a whole peer network through a peering link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    /// Deterministic identifier `{name}-{index}`.
    pub id: String,
    pub source: NetworkTier,
    pub source_tier: SubnetTier,
    pub source_subnet: String,
    pub route_table_id: String,
    pub destination: NetworkTier,
    pub destination_cidr: Ipv4,
    pub peering_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_is_unordered() {
        let a = PeeringLink::new(NetworkTier::Management, NetworkTier::Production);
        let b = PeeringLink::new(NetworkTier::Production, NetworkTier::Management);
        assert_eq!(a, b);
        assert_eq!(a.handle, "pcx-prod-mgmt");
        assert_eq!(a.id, "ManagementToProductionPeering");
        assert!(a.joins(NetworkTier::Management, NetworkTier::Production));
        assert!(a.joins(NetworkTier::Production, NetworkTier::Management));
        assert!(!a.joins(NetworkTier::Production, NetworkTier::Development));
    }
}
