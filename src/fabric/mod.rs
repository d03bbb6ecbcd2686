//! Topology building logic.
//!
//! This module turns configuration into resources:
//! - [`network`] - subnet carving, egress and endpoints per network
//! - [`dns`] - resolver address derivation
//! - [`overlap`] - address block overlap checks
//! - [`flow_log`] - flow-log sinks and retention
//! - [`policy`] - allowed peerings and route grants
//! - [`routes`] - peering links and the route fabric

mod dns;
mod flow_log;
mod network;
mod overlap;
mod policy;
mod routes;

pub use dns::{derive_resolver_address, RESOLVER_OFFSET};
pub use flow_log::{
    apply_retention, attach_flow_logs, configure_retention, flow_log_identity,
    retention_identity, FlowLogAttachment,
};
pub use network::{build_network, zone_names, MIN_SUBNET_MASK};
pub use overlap::{
    check_disjoint, find_overlapping_networks, log_overlapping_networks, OverlapConflict,
};
pub use policy::{
    is_cross_pair, RouteDenial, RouteGrant, TopologyPolicy, PRODUCTION_ISOLATED_TO_MANAGEMENT,
};
pub use routes::{
    assert_no_cross_routes, attach_peering_routes, build_route_fabric, establish_peering,
    establish_peering_links, establish_routes,
};
