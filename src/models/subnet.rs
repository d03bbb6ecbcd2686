//! Subnet tiers and the per-zone subnet instances carved from a network.

use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic tier of a subnet class.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubnetTier {
    Public,
    Private,
    Isolated,
}

/// What hosts in a subnet tier are allowed to reach.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// Routed to the internet gateway, reachable from outside.
    InternetFacing,
    /// Outbound only, through a NAT gateway.
    OutboundOnly,
    /// No route out of the network.
    NoEgress,
}

impl SubnetTier {
    pub const ALL: [SubnetTier; 3] = [
        SubnetTier::Public,
        SubnetTier::Private,
        SubnetTier::Isolated,
    ];

    /// Subnet name used in resource identifiers.
    pub fn subnet_name(self) -> &'static str {
        match self {
            SubnetTier::Public => "DMZ",
            SubnetTier::Private => "Application",
            SubnetTier::Isolated => "Database",
        }
    }

    pub fn reachability(self) -> Reachability {
        match self {
            SubnetTier::Public => Reachability::InternetFacing,
            SubnetTier::Private => Reachability::OutboundOnly,
            SubnetTier::Isolated => Reachability::NoEgress,
        }
    }
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubnetTier::Public => "Public",
            SubnetTier::Private => "Private",
            SubnetTier::Isolated => "Isolated",
        };
        f.write_str(s)
    }
}

/// A tier of subnets replicated across zones, with its prefix length.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubnetClass {
    pub tier: SubnetTier,
    pub cidr_mask: u8,
}

impl SubnetClass {
    pub fn new(tier: SubnetTier, cidr_mask: u8) -> Self {
        SubnetClass { tier, cidr_mask }
    }

    pub fn reachability(&self) -> Reachability {
        self.tier.reachability()
    }
}

/// Where a route table entry sends its traffic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum NextHop {
    InternetGateway(String),
    NatGateway(String),
    GatewayEndpoint(String),
    PeeringLink(String),
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextHop::InternetGateway(id)
            | NextHop::NatGateway(id)
            | NextHop::GatewayEndpoint(id)
            | NextHop::PeeringLink(id) => f.write_str(id),
        }
    }
}

/// Route a subnet gets from the network itself (egress, endpoints).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BaseRoute {
    /// Destination block, or a service prefix list name for endpoints.
    pub destination: String,
    pub next_hop: NextHop,
}

/// Route table owned by exactly one subnet instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub id: String,
    pub routes: Vec<BaseRoute>,
}

/// One subnet of a class in one availability zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetInstance {
    /// Unique identifier, e.g. `Production/DMZSubnet1`.
    pub id: String,
    pub tier: SubnetTier,
    pub zone: String,
    pub zone_index: usize,
    pub cidr: Ipv4,
    pub route_table: RouteTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_reachability() {
        assert_eq!(SubnetTier::Public.reachability(), Reachability::InternetFacing);
        assert_eq!(SubnetTier::Private.reachability(), Reachability::OutboundOnly);
        assert_eq!(SubnetTier::Isolated.reachability(), Reachability::NoEgress);
        assert_eq!(
            SubnetClass::new(SubnetTier::Isolated, 23).reachability(),
            Reachability::NoEgress
        );
    }

    #[test]
    fn test_tier_names() {
        let names: Vec<&str> = SubnetTier::ALL.iter().map(|t| t.subnet_name()).collect();
        assert_eq!(names, vec!["DMZ", "Application", "Database"]);
        assert_eq!(SubnetTier::Isolated.to_string(), "Isolated");
    }

    #[test]
    fn test_tier_serde() {
        let json = serde_json::to_string(&SubnetTier::Private).unwrap();
        assert_eq!(json, "\"Private\"");
        assert!(serde_json::from_str::<SubnetTier>("\"Privat\"").is_err());
    }
}
