//! The synthesized topology: every declared resource in one place.

use crate::config::TopologyConfig;
use crate::fabric::{
    attach_flow_logs, attach_peering_routes, build_network, build_route_fabric, check_disjoint,
    configure_retention, establish_peering_links, flow_log_identity, retention_identity,
    TopologyPolicy,
};
use crate::models::{
    FlowLogCapture, LogRetention, LogSink, NetworkSpace, NetworkTier, PeeringLink, RouteEntry,
    ServiceIdentity, TopologyError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub region: String,
    pub networks: Vec<NetworkSpace>,
    pub identities: Vec<ServiceIdentity>,
    pub log_sinks: Vec<LogSink>,
    pub flow_logs: Vec<FlowLogCapture>,
    pub retentions: Vec<LogRetention>,
    pub peering_links: Vec<PeeringLink>,
    pub routes: Vec<RouteEntry>,
    /// Flow-log attachments that could not be declared, one message each.
    /// `build_topology` rejects duplicate tiers up front, so this stays empty
    /// for anything it builds; it is filled when a topology is assembled from
    /// a template or from `attach_flow_logs` results directly.
    #[serde(default)]
    pub flow_log_failures: Vec<String>,
}

impl Topology {
    pub fn network(&self, tier: NetworkTier) -> Option<&NetworkSpace> {
        self.networks.iter().find(|n| n.tier == tier)
    }

    /// Routes crossing the link between `a` and `b`, in either direction.
    pub fn routes_between(&self, a: NetworkTier, b: NetworkTier) -> Vec<&RouteEntry> {
        self.routes
            .iter()
            .filter(|r| {
                (r.source == a && r.destination == b) || (r.source == b && r.destination == a)
            })
            .collect()
    }

    pub fn subnet_count(&self) -> usize {
        self.networks.iter().map(|n| n.subnets.len()).sum()
    }
}

/// Build the whole topology: networks, flow logs, peering, routes.
///
/// Duplicate tiers fail here before flow logs are attached, so a duplicate
/// sink never reaches `attach_flow_logs` from this path. Its per-network
/// failure handling is kept for callers that attach flow logs to their own
/// network lists.
pub fn build_topology(
    config: &TopologyConfig,
    policy: &TopologyPolicy,
) -> Result<Topology, TopologyError> {
    log::info!(
        "#Start build_topology() region={} networks={}",
        config.region,
        config.networks.len()
    );
    policy.validate()?;

    let mut tiers = HashSet::new();
    for network in &config.networks {
        if !tiers.insert(network.tier) {
            return Err(TopologyError::DuplicateResource(network.tier.to_string()));
        }
    }

    let mut networks = config
        .networks
        .iter()
        .map(|n| build_network(n, &config.region))
        .collect::<Result<Vec<_>, _>>()?;
    check_disjoint(&networks)?;

    let flow_identity = flow_log_identity();
    let mut log_sinks = Vec::new();
    let mut flow_logs = Vec::new();
    let mut flow_log_failures = Vec::new();
    for (network, attached) in networks
        .iter()
        .zip(attach_flow_logs(&networks, &flow_identity))
    {
        match attached {
            Ok(a) => {
                log_sinks.push(a.sink);
                flow_logs.push(a.capture);
            }
            Err(e) => {
                log::error!("Flow log for '{}' failed: {e}", network.name);
                flow_log_failures.push(format!("{}: {e}", network.name));
            }
        }
    }
    let retain_identity = retention_identity();
    let retentions = configure_retention(&log_sinks, &retain_identity);

    let peering_links = establish_peering_links(&networks, policy)?;
    let routes = build_route_fabric(&networks, &peering_links, policy)?;
    attach_peering_routes(&mut networks, &routes)?;

    log::info!(
        "Topology: {} networks, {} peering links, {} routes, {} flow logs",
        networks.len(),
        peering_links.len(),
        routes.len(),
        flow_logs.len()
    );

    Ok(Topology {
        region: config.region.clone(),
        networks,
        identities: vec![flow_identity, retain_identity],
        log_sinks,
        flow_logs,
        retentions,
        peering_links,
        routes,
        flow_log_failures,
    })
}
