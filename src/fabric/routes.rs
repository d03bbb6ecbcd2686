//! Peering links and the route fabric across them.

use super::policy::{is_cross_pair, RouteGrant, TopologyPolicy};
use crate::models::{
    BaseRoute, NetworkSpace, NetworkTier, NextHop, PeeringLink, RouteEntry, SubnetTier,
    TopologyError,
};
use std::collections::HashSet;
use std::sync::OnceLock;

static ROUTE_NAME_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn route_name_regex() -> &'static regex::Regex {
    ROUTE_NAME_REGEX.get_or_init(|| {
        regex::Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("Invalid Regex")
    })
}

/// Link two networks, if the policy lets them peer.
pub fn establish_peering(
    a: &NetworkSpace,
    b: &NetworkSpace,
    policy: &TopologyPolicy,
) -> Result<PeeringLink, TopologyError> {
    if !policy.allows_peering(a.tier, b.tier) {
        log::warn!("Refusing to peer '{}' with '{}'", a.name, b.name);
        return Err(TopologyError::PeeringNotPermitted {
            first: a.name.clone(),
            second: b.name.clone(),
        });
    }
    let link = PeeringLink::new(a.tier, b.tier);
    log::info!("Peering {link}");
    Ok(link)
}

/// Create every peering link the policy allows, one per unordered pair.
pub fn establish_peering_links(
    networks: &[NetworkSpace],
    policy: &TopologyPolicy,
) -> Result<Vec<PeeringLink>, TopologyError> {
    let mut links: Vec<PeeringLink> = Vec::new();
    for (a, b) in &policy.peerings {
        let a = find_network(networks, *a)?;
        let b = find_network(networks, *b)?;
        let link = establish_peering(a, b, policy)?;
        if links.iter().any(|l| l.handle == link.handle) {
            return Err(TopologyError::DuplicateResource(link.handle));
        }
        links.push(link);
    }
    Ok(links)
}

/// Give every `tier` subnet of `source` a route to the whole `destination`
/// block through `link`.
///
/// Routes are named `{name}-{index}` with the index counting the matching
/// subnets in zone order, so applying the same call again yields the same
/// identifiers. A tier with no subnets in `source` yields no routes.
pub fn establish_routes(
    name: &str,
    source: &NetworkSpace,
    tier: SubnetTier,
    destination: &NetworkSpace,
    link: &PeeringLink,
    policy: &TopologyPolicy,
) -> Result<Vec<RouteEntry>, TopologyError> {
    if !route_name_regex().is_match(name) {
        return Err(TopologyError::InvalidResourceName(name.to_string()));
    }
    if !link.joins(source.tier, destination.tier) {
        return Err(TopologyError::LinkMismatch {
            link: link.handle.clone(),
            from: source.name.clone(),
            to: destination.name.clone(),
        });
    }
    let grant = RouteGrant::new(source.tier, tier, destination.tier);
    if !policy.allows_route(&grant) {
        log::warn!("Route '{name}' ({grant}) not granted by policy");
        return Err(TopologyError::RouteNotPermitted {
            name: name.to_string(),
            from: source.name.clone(),
            to: destination.name.clone(),
        });
    }

    let routes: Vec<RouteEntry> = source
        .select_subnets(tier)
        .into_iter()
        .enumerate()
        .map(|(index, subnet)| RouteEntry {
            id: format!("{name}-{index}"),
            source: source.tier,
            source_tier: tier,
            source_subnet: subnet.id.clone(),
            route_table_id: subnet.route_table.id.clone(),
            destination: destination.tier,
            destination_cidr: destination.cidr,
            peering_link: link.handle.clone(),
        })
        .collect();
    assert_no_cross_routes(&routes)?;

    if routes.is_empty() {
        log::debug!("Route '{name}': no {tier} subnets in '{}'", source.name);
    } else {
        log::info!(
            "Route '{name}': {} x {tier} {} -> {} via {}",
            routes.len(),
            source.name,
            destination.cidr,
            link.handle
        );
    }
    Ok(routes)
}

/// Walk the policy's grants in order and derive every peering route.
pub fn build_route_fabric(
    networks: &[NetworkSpace],
    links: &[PeeringLink],
    policy: &TopologyPolicy,
) -> Result<Vec<RouteEntry>, TopologyError> {
    let mut routes = Vec::new();
    for grant in &policy.grants {
        let source = find_network(networks, grant.source)?;
        let destination = find_network(networks, grant.destination)?;
        let link = links
            .iter()
            .find(|l| l.joins(grant.source, grant.destination))
            .ok_or_else(|| TopologyError::PeeringNotPermitted {
                first: source.name.clone(),
                second: destination.name.clone(),
            })?;
        routes.extend(establish_routes(
            &grant.route_name(),
            source,
            grant.tier,
            destination,
            link,
            policy,
        )?);
    }

    let mut seen = HashSet::new();
    if let Some(dup) = routes.iter().find(|r| !seen.insert(r.id.as_str())) {
        return Err(TopologyError::DuplicateResource(dup.id.clone()));
    }
    assert_no_cross_routes(&routes)?;
    log::info!("Route fabric: {} routes over {} links", routes.len(), links.len());
    Ok(routes)
}

/// Production and Development must never route to each other.
pub fn assert_no_cross_routes(routes: &[RouteEntry]) -> Result<(), TopologyError> {
    match routes.iter().find(|r| is_cross_pair(r.source, r.destination)) {
        Some(r) => Err(TopologyError::RouteNotPermitted {
            name: r.id.clone(),
            from: r.source.to_string(),
            to: r.destination.to_string(),
        }),
        None => Ok(()),
    }
}

/// Write each peering route into the route table of its source subnet.
pub fn attach_peering_routes(
    networks: &mut [NetworkSpace],
    routes: &[RouteEntry],
) -> Result<(), TopologyError> {
    for route in routes {
        let table = networks
            .iter_mut()
            .filter(|n| n.tier == route.source)
            .flat_map(|n| n.subnets.iter_mut())
            .map(|s| &mut s.route_table)
            .find(|t| t.id == route.route_table_id)
            .ok_or_else(|| TopologyError::UnknownNetwork(route.route_table_id.clone()))?;
        let entry = BaseRoute {
            destination: route.destination_cidr.to_string(),
            next_hop: NextHop::PeeringLink(route.peering_link.clone()),
        };
        if !table.routes.contains(&entry) {
            table.routes.push(entry);
        }
    }
    Ok(())
}

fn find_network(
    networks: &[NetworkSpace],
    tier: NetworkTier,
) -> Result<&NetworkSpace, TopologyError> {
    networks
        .iter()
        .find(|n| n.tier == tier)
        .ok_or_else(|| TopologyError::UnknownNetwork(tier.to_string()))
}
