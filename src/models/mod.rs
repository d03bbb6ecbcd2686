//! Domain models for the network topology.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Ipv4`] - IPv4 block with CIDR notation support
//! - [`SubnetTier`], [`SubnetInstance`] - subnet classes and their per-zone instances
//! - [`NetworkSpace`] - virtual network with its subnets and egress
//! - [`PeeringLink`], [`RouteEntry`] - the cross-network route fabric
//! - [`LogRetentionPolicy`] and friends - flow-log collection
//! - [`TopologyError`] - everything that can fail

mod error;
mod ipv4;
mod network;
mod peering;
mod retention;
mod subnet;

pub use error::TopologyError;
pub use ipv4::{
    broadcast_addr, cut_addr, get_cidr_mask, ip_after_subnet, next_subnet_ipv4, Ipv4, MAX_LENGTH,
};
pub use network::{
    EgressConfig, GatewayEndpoint, GatewayService, NatGateway, NetworkSpace, NetworkTier,
};
pub use peering::{PeeringLink, RouteEntry};
pub use retention::{
    FlowLogCapture, LogRetention, LogRetentionPolicy, LogSink, RetryPolicy, ServiceIdentity,
    TrafficType,
};
pub use subnet::{
    BaseRoute, NextHop, Reachability, RouteTable, SubnetClass, SubnetInstance, SubnetTier,
};
