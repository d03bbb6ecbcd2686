//! Errors raised while building and validating a topology.

use thiserror::Error;

/// Everything that can go wrong while synthesizing the network topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("invalid address block '{block}': {reason}")]
    InvalidAddressBlock { block: String, reason: String },

    #[error("unsupported availability zone count {count} for '{network}' (allowed 1..={max})")]
    UnsupportedAzCount {
        network: String,
        count: usize,
        max: usize,
    },

    #[error("network '{network}' asks for {nat} NAT gateways but only has {azs} zones")]
    InvalidNatGatewayCount {
        network: String,
        nat: usize,
        azs: usize,
    },

    #[error("address space of '{network}' ({block}) exhausted while carving /{mask} subnets")]
    AddressSpaceExhausted {
        network: String,
        block: String,
        mask: u8,
    },

    #[error("networks '{first}' and '{second}' overlap on {block}")]
    OverlappingNetworks {
        first: String,
        second: String,
        block: String,
    },

    #[error("peering between '{first}' and '{second}' is not permitted")]
    PeeringNotPermitted { first: String, second: String },

    #[error("route '{name}' from '{from}' to '{to}' is not permitted")]
    RouteNotPermitted {
        name: String,
        from: String,
        to: String,
    },

    #[error("peering link '{link}' does not join '{from}' and '{to}'")]
    LinkMismatch {
        link: String,
        from: String,
        to: String,
    },

    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("invalid resource name '{0}'")]
    InvalidResourceName(String),

    #[error("duplicate resource identifier '{0}'")]
    DuplicateResource(String),

    #[error("'{resource}' still failing after {attempts} attempts: {last_error}")]
    RetryExhausted {
        resource: String,
        attempts: u32,
        last_error: String,
    },
}

impl TopologyError {
    pub(crate) fn invalid_block(block: impl ToString, reason: impl Into<String>) -> Self {
        TopologyError::InvalidAddressBlock {
            block: block.to_string(),
            reason: reason.into(),
        }
    }
}
