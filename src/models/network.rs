//! Virtual network (VPC) data model.

use super::{Ipv4, SubnetInstance, SubnetTier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Role of a network in the topology.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetworkTier {
    Production,
    Development,
    Management,
}

impl NetworkTier {
    pub const ALL: [NetworkTier; 3] = [
        NetworkTier::Production,
        NetworkTier::Development,
        NetworkTier::Management,
    ];

    /// Short prefix used when naming routes, e.g. `mgmtPublicToDev`.
    pub fn short_name(self) -> &'static str {
        match self {
            NetworkTier::Production => "prod",
            NetworkTier::Development => "dev",
            NetworkTier::Management => "mgmt",
        }
    }

    /// Subnet tiers a network of this role gets. Management hosts never sit
    /// fully air-gapped, so it has no isolated tier.
    pub fn subnet_tiers(self) -> &'static [SubnetTier] {
        match self {
            NetworkTier::Production | NetworkTier::Development => &SubnetTier::ALL,
            NetworkTier::Management => &[SubnetTier::Public, SubnetTier::Private],
        }
    }
}

impl fmt::Display for NetworkTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkTier::Production => "Production",
            NetworkTier::Development => "Development",
            NetworkTier::Management => "Management",
        };
        f.write_str(s)
    }
}

/// Services reachable through a gateway-type endpoint.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GatewayService {
    S3,
    DynamoDb,
}

impl GatewayService {
    pub fn service_name(self, region: &str) -> String {
        match self {
            GatewayService::S3 => format!("com.amazonaws.{region}.s3"),
            GatewayService::DynamoDb => format!("com.amazonaws.{region}.dynamodb"),
        }
    }
}

/// Gateway endpoint attached to every route table of a network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatewayEndpoint {
    pub id: String,
    pub service: GatewayService,
    pub service_name: String,
}

/// NAT gateway living in a public subnet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NatGateway {
    pub id: String,
    pub subnet_id: String,
    pub zone_index: usize,
}

/// Egress of a network: one internet gateway shared by the public tier and
/// the NAT gateways used by the private tier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EgressConfig {
    pub internet_gateway: Option<String>,
    pub nat_gateways: Vec<NatGateway>,
}

/// An isolated virtual network with its own address block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkSpace {
    pub name: String,
    pub tier: NetworkTier,
    pub cidr: Ipv4,
    pub zones: Vec<String>,
    pub subnets: Vec<SubnetInstance>,
    pub egress: EgressConfig,
    pub gateway_endpoints: Vec<GatewayEndpoint>,
    /// Internal DNS resolver address, derived for the management network.
    pub resolver_address: Option<Ipv4Addr>,
}

impl NetworkSpace {
    /// All subnet instances of a tier, in zone order.
    pub fn select_subnets(&self, tier: SubnetTier) -> Vec<&SubnetInstance> {
        self.subnets.iter().filter(|s| s.tier == tier).collect()
    }

    /// Subnet tiers actually present in this network.
    pub fn tiers(&self) -> Vec<SubnetTier> {
        let mut tiers: Vec<SubnetTier> = self.subnets.iter().map(|s| s.tier).collect();
        tiers.sort();
        tiers.dedup();
        tiers
    }
}

impl fmt::Display for NetworkSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({} subnets, {} zones, {} NAT)",
            self.name,
            self.cidr,
            self.subnets.len(),
            self.zones.len(),
            self.egress.nat_gateways.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_has_no_isolated_tier() {
        assert_eq!(
            NetworkTier::Management.subnet_tiers(),
            &[SubnetTier::Public, SubnetTier::Private]
        );
        assert_eq!(NetworkTier::Production.subnet_tiers().len(), 3);
    }

    #[test]
    fn test_short_names() {
        let names: Vec<&str> = NetworkTier::ALL.iter().map(|t| t.short_name()).collect();
        assert_eq!(names, vec!["prod", "dev", "mgmt"]);
    }

    #[test]
    fn test_gateway_service_name() {
        assert_eq!(
            GatewayService::S3.service_name("us-east-1"),
            "com.amazonaws.us-east-1.s3"
        );
    }
}
