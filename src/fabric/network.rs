//! Network fabric builder.
//!
//! Carves subnet classes out of a network block, zone by zone, and wires up
//! the egress (internet gateway, NAT) and gateway endpoints of each subnet's
//! route table.

use super::dns::derive_resolver_address;
use crate::config::{NetworkConfig, MAX_AZ_COUNT};
use crate::models::{
    next_subnet_ipv4, BaseRoute, EgressConfig, GatewayEndpoint, Ipv4, NatGateway, NetworkSpace,
    NetworkTier, NextHop, Reachability, RouteTable, SubnetClass, SubnetInstance, TopologyError,
};

/// Smallest subnet the provider accepts.
pub const MIN_SUBNET_MASK: u8 = 28;

const DEFAULT_ROUTE: &str = "0.0.0.0/0";

/// Availability zone names for a region, e.g. `us-east-1a`, `us-east-1b`.
pub fn zone_names(region: &str, count: usize) -> Vec<String> {
    (b'a'..=b'z')
        .take(count)
        .map(|c| format!("{region}{}", c as char))
        .collect()
}

fn validate(config: &NetworkConfig) -> Result<(), TopologyError> {
    if config.az_count == 0 || config.az_count > MAX_AZ_COUNT {
        return Err(TopologyError::UnsupportedAzCount {
            network: config.name.clone(),
            count: config.az_count,
            max: MAX_AZ_COUNT,
        });
    }
    // private subnets need somewhere to send outbound traffic
    if config.nat_gateway_count == 0 || config.nat_gateway_count > config.az_count {
        return Err(TopologyError::InvalidNatGatewayCount {
            network: config.name.clone(),
            nat: config.nat_gateway_count,
            azs: config.az_count,
        });
    }
    if !config.cidr.is_network_address() {
        return Err(TopologyError::invalid_block(
            config.cidr,
            format!("host bits set, expected {}", config.cidr.lo()),
        ));
    }
    if config.subnet_mask > MIN_SUBNET_MASK {
        return Err(TopologyError::invalid_block(
            config.cidr,
            format!(
                "subnet mask /{} is smaller than /{MIN_SUBNET_MASK}",
                config.subnet_mask
            ),
        ));
    }
    if config.subnet_mask <= config.cidr.mask {
        return Err(TopologyError::AddressSpaceExhausted {
            network: config.name.clone(),
            block: config.cidr.to_string(),
            mask: config.subnet_mask,
        });
    }
    Ok(())
}

/// Carve `count` consecutive subnets per class, class by class.
fn carve(
    config: &NetworkConfig,
    classes: &[SubnetClass],
    count: usize,
) -> Result<Vec<(SubnetClass, usize, Ipv4)>, TopologyError> {
    let exhausted = || TopologyError::AddressSpaceExhausted {
        network: config.name.clone(),
        block: config.cidr.to_string(),
        mask: config.subnet_mask,
    };
    let mut cursor = Some(Ipv4 {
        addr: config.cidr.lo(),
        mask: config.subnet_mask,
    });
    let mut carved = Vec::with_capacity(classes.len() * count);
    for class in classes {
        for zone_index in 0..count {
            let subnet = cursor
                .filter(|c| config.cidr.contains_block(c))
                .ok_or_else(exhausted)?;
            carved.push((*class, zone_index, subnet));
            cursor = next_subnet_ipv4(subnet, Some(class.cidr_mask))?;
        }
    }
    Ok(carved)
}

/// Build a network from its config.
///
/// Subnets are laid out from the block base: the public class for every
/// zone, then the private class, then the isolated class. NAT gateways sit in
/// the public subnets of the first `nat_gateway_count` zones.
pub fn build_network(config: &NetworkConfig, region: &str) -> Result<NetworkSpace, TopologyError> {
    log::info!(
        "#Start build_network() '{}' {} zones={} nat={}",
        config.name,
        config.cidr,
        config.az_count,
        config.nat_gateway_count
    );
    validate(config)?;

    let zones = zone_names(region, config.az_count);
    let classes: Vec<SubnetClass> = config
        .tier
        .subnet_tiers()
        .iter()
        .map(|t| SubnetClass::new(*t, config.subnet_mask))
        .collect();
    let carved = carve(config, &classes, zones.len())?;

    let internet_gateway = classes
        .iter()
        .any(|c| c.reachability() == Reachability::InternetFacing)
        .then(|| format!("{}/IGW", config.name));

    let nat_gateways: Vec<NatGateway> = carved
        .iter()
        .filter(|(class, zone_index, _)| {
            class.reachability() == Reachability::InternetFacing
                && *zone_index < config.nat_gateway_count
        })
        .map(|(class, zone_index, _)| {
            let subnet_id = subnet_id(&config.name, class, *zone_index);
            NatGateway {
                id: format!("{subnet_id}/NATGateway"),
                subnet_id,
                zone_index: *zone_index,
            }
        })
        .collect();

    let gateway_endpoints: Vec<GatewayEndpoint> = config
        .gateway_endpoints
        .iter()
        .map(|service| GatewayEndpoint {
            id: format!("{}/{:?}Endpoint", config.name, service),
            service: *service,
            service_name: service.service_name(region),
        })
        .collect();

    let subnets = carved
        .iter()
        .map(|(class, zone_index, cidr)| {
            let id = subnet_id(&config.name, class, *zone_index);
            let mut routes = Vec::new();
            match class.reachability() {
                Reachability::InternetFacing => {
                    if let Some(igw) = &internet_gateway {
                        routes.push(BaseRoute {
                            destination: DEFAULT_ROUTE.to_string(),
                            next_hop: NextHop::InternetGateway(igw.clone()),
                        });
                    }
                }
                Reachability::OutboundOnly => {
                    let nat = nat_gateways
                        .iter()
                        .find(|n| n.zone_index == *zone_index)
                        .or_else(|| nat_gateways.first());
                    if let Some(nat) = nat {
                        routes.push(BaseRoute {
                            destination: DEFAULT_ROUTE.to_string(),
                            next_hop: NextHop::NatGateway(nat.id.clone()),
                        });
                    }
                }
                Reachability::NoEgress => {}
            }
            routes.extend(gateway_endpoints.iter().map(|e| BaseRoute {
                destination: e.service_name.clone(),
                next_hop: NextHop::GatewayEndpoint(e.id.clone()),
            }));
            log::debug!("  subnet {id} {cidr} in {}", zones[*zone_index]);
            SubnetInstance {
                route_table: RouteTable {
                    id: format!("{id}/RouteTable"),
                    routes,
                },
                id,
                tier: class.tier,
                zone: zones[*zone_index].clone(),
                zone_index: *zone_index,
                cidr: *cidr,
            }
        })
        .collect();

    let resolver_address = match config.tier {
        NetworkTier::Management => Some(derive_resolver_address(&config.cidr)?),
        NetworkTier::Production | NetworkTier::Development => None,
    };

    Ok(NetworkSpace {
        name: config.name.clone(),
        tier: config.tier,
        cidr: config.cidr,
        zones,
        subnets,
        egress: EgressConfig {
            internet_gateway,
            nat_gateways,
        },
        gateway_endpoints,
        resolver_address,
    })
}

fn subnet_id(network: &str, class: &SubnetClass, zone_index: usize) -> String {
    format!("{network}/{}Subnet{}", class.tier.subnet_name(), zone_index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GatewayService, SubnetTier};
    use std::net::Ipv4Addr;

    fn cidrs(network: &NetworkSpace, tier: SubnetTier) -> Vec<String> {
        network
            .select_subnets(tier)
            .iter()
            .map(|s| s.cidr.to_string())
            .collect()
    }

    #[test]
    fn test_zone_names() {
        assert_eq!(zone_names("us-east-1", 2), vec!["us-east-1a", "us-east-1b"]);
        assert!(zone_names("us-east-1", 0).is_empty());
    }

    #[test]
    fn test_build_production() {
        let config = NetworkConfig::for_tier(NetworkTier::Production);
        let prod = build_network(&config, "us-east-1").unwrap();

        assert_eq!(prod.subnets.len(), 6);
        assert_eq!(cidrs(&prod, SubnetTier::Public), vec!["10.50.0.0/23", "10.50.2.0/23"]);
        assert_eq!(cidrs(&prod, SubnetTier::Private), vec!["10.50.4.0/23", "10.50.6.0/23"]);
        assert_eq!(cidrs(&prod, SubnetTier::Isolated), vec!["10.50.8.0/23", "10.50.10.0/23"]);
        assert!(prod.subnets.iter().all(|s| prod.cidr.contains_block(&s.cidr)));
        assert_eq!(prod.subnets[0].id, "Production/DMZSubnet1");
        assert_eq!(prod.subnets[0].route_table.id, "Production/DMZSubnet1/RouteTable");
        assert_eq!(prod.resolver_address, None);
        assert_eq!(prod.gateway_endpoints.len(), 1);
        assert_eq!(prod.gateway_endpoints[0].service, GatewayService::S3);
    }

    #[test]
    fn test_egress_by_tier() {
        let config = NetworkConfig::for_tier(NetworkTier::Development);
        let dev = build_network(&config, "us-east-1").unwrap();

        assert_eq!(dev.egress.internet_gateway.as_deref(), Some("Development/IGW"));
        assert_eq!(dev.egress.nat_gateways.len(), 1);
        let nat = &dev.egress.nat_gateways[0];
        assert_eq!(nat.subnet_id, "Development/DMZSubnet1");

        for subnet in &dev.subnets {
            let default_hop = subnet
                .route_table
                .routes
                .iter()
                .find(|r| r.destination == "0.0.0.0/0")
                .map(|r| r.next_hop.clone());
            match subnet.tier {
                SubnetTier::Public => assert_eq!(
                    default_hop,
                    Some(NextHop::InternetGateway("Development/IGW".to_string()))
                ),
                // single NAT shared by both zones
                SubnetTier::Private => {
                    assert_eq!(default_hop, Some(NextHop::NatGateway(nat.id.clone())))
                }
                SubnetTier::Isolated => assert_eq!(default_hop, None),
            }
            // every table reaches the S3 endpoint
            assert!(subnet
                .route_table
                .routes
                .iter()
                .any(|r| matches!(r.next_hop, NextHop::GatewayEndpoint(_))));
        }
    }

    #[test]
    fn test_build_management() {
        let config = NetworkConfig::for_tier(NetworkTier::Management);
        let mgmt = build_network(&config, "us-east-1").unwrap();

        assert_eq!(mgmt.subnets.len(), 4);
        assert!(mgmt.select_subnets(SubnetTier::Isolated).is_empty());
        assert_eq!(mgmt.tiers(), vec![SubnetTier::Public, SubnetTier::Private]);
        assert_eq!(mgmt.resolver_address, Some(Ipv4Addr::new(10, 70, 0, 2)));
        assert!(mgmt.gateway_endpoints.is_empty());
    }

    #[test]
    fn test_nat_per_zone() {
        let mut config = NetworkConfig::for_tier(NetworkTier::Production);
        config.az_count = 3;
        config.nat_gateway_count = 2;
        let prod = build_network(&config, "eu-west-1").unwrap();

        assert_eq!(prod.zones, vec!["eu-west-1a", "eu-west-1b", "eu-west-1c"]);
        assert_eq!(prod.egress.nat_gateways.len(), 2);
        let private = prod.select_subnets(SubnetTier::Private);
        let hop = |i: usize| private[i].route_table.routes[0].next_hop.to_string();
        assert_eq!(hop(0), "Production/DMZSubnet1/NATGateway");
        assert_eq!(hop(1), "Production/DMZSubnet2/NATGateway");
        // zone without its own NAT falls back to the first one
        assert_eq!(hop(2), "Production/DMZSubnet1/NATGateway");
    }

    #[test]
    fn test_invalid_az_count() {
        let mut config = NetworkConfig::for_tier(NetworkTier::Production);
        config.az_count = 0;
        assert!(matches!(
            build_network(&config, "us-east-1"),
            Err(TopologyError::UnsupportedAzCount { count: 0, .. })
        ));
        config.az_count = MAX_AZ_COUNT + 1;
        assert!(build_network(&config, "us-east-1").is_err());
    }

    #[test]
    fn test_invalid_nat_count() {
        let mut config = NetworkConfig::for_tier(NetworkTier::Development);
        config.nat_gateway_count = 3;
        assert!(matches!(
            build_network(&config, "us-east-1"),
            Err(TopologyError::InvalidNatGatewayCount { nat: 3, azs: 2, .. })
        ));
    }

    #[test]
    fn test_host_bits_rejected() {
        let mut config = NetworkConfig::for_tier(NetworkTier::Development);
        config.cidr = Ipv4::new("10.60.0.1/16").unwrap();
        assert!(matches!(
            build_network(&config, "us-east-1"),
            Err(TopologyError::InvalidAddressBlock { .. })
        ));
    }

    #[test]
    fn test_address_space_exhausted() {
        // 6 x /23 does not fit in a /22
        let mut config = NetworkConfig::for_tier(NetworkTier::Production);
        config.cidr = Ipv4::new("10.50.0.0/22").unwrap();
        assert!(matches!(
            build_network(&config, "us-east-1"),
            Err(TopologyError::AddressSpaceExhausted { mask: 23, .. })
        ));
        // subnet as large as the block
        config.cidr = Ipv4::new("10.50.0.0/23").unwrap();
        assert!(build_network(&config, "us-east-1").is_err());
    }

    #[test]
    fn test_subnet_mask_too_small() {
        let mut config = NetworkConfig::for_tier(NetworkTier::Production);
        config.subnet_mask = 29;
        assert!(build_network(&config, "us-east-1").is_err());
    }

    #[test]
    fn test_block_at_end_of_address_space() {
        let mut config = NetworkConfig::for_tier(NetworkTier::Management);
        config.cidr = Ipv4::new("255.255.248.0/21").unwrap();
        let mgmt = build_network(&config, "us-east-1").unwrap();
        assert_eq!(
            cidrs(&mgmt, SubnetTier::Private),
            vec!["255.255.252.0/23", "255.255.254.0/23"]
        );
    }
}
