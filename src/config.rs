//! Topology configuration and crate-wide defaults.

use crate::models::{GatewayService, Ipv4, NetworkTier, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const PRODUCTION_CIDR: Ipv4 = Ipv4 {
    addr: Ipv4Addr::new(10, 50, 0, 0),
    mask: 16,
};
pub const DEVELOPMENT_CIDR: Ipv4 = Ipv4 {
    addr: Ipv4Addr::new(10, 60, 0, 0),
    mask: 16,
};
pub const MANAGEMENT_CIDR: Ipv4 = Ipv4 {
    addr: Ipv4Addr::new(10, 70, 0, 0),
    mask: 16,
};

pub const DEFAULT_AZ_COUNT: usize = 2;
/// Zones are named `{region}a` .. `{region}f`.
pub const MAX_AZ_COUNT: usize = 6;
pub const DEFAULT_NAT_GATEWAY_COUNT: usize = 1;
/// Prefix length of every subnet class.
pub const DEFAULT_SUBNET_MASK: u8 = 23;

/// Retention settings are eventually consistent, so they are retried with a
/// fixed delay.
pub const RETENTION_RETRY_BASE_DELAY: Duration = Duration::from_secs(30 * 60);
pub const RETENTION_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Environment variable holding an optional config file path.
pub const CONFIG_ENV_VAR: &str = "TOPOLOGY_CONFIG";

/// Timezone used to stamp synthesized template file names.
pub const TEMPLATE_TIMEZONE: chrono_tz::Tz = chrono_tz::Pacific::Auckland;

/// Flow-log retention per network tier, in days.
pub fn retention_days(tier: NetworkTier) -> u32 {
    match tier {
        NetworkTier::Production => 30,
        NetworkTier::Development => 3,
        NetworkTier::Management => 14,
    }
}

pub fn retention_retry() -> RetryPolicy {
    RetryPolicy {
        base_delay: RETENTION_RETRY_BASE_DELAY,
        max_attempts: RETENTION_RETRY_MAX_ATTEMPTS,
    }
}

fn default_az_count() -> usize {
    DEFAULT_AZ_COUNT
}

fn default_nat_gateway_count() -> usize {
    DEFAULT_NAT_GATEWAY_COUNT
}

fn default_subnet_mask() -> u8 {
    DEFAULT_SUBNET_MASK
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Settings for one network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub cidr: Ipv4,
    pub tier: NetworkTier,
    #[serde(default = "default_az_count")]
    pub az_count: usize,
    #[serde(default = "default_nat_gateway_count")]
    pub nat_gateway_count: usize,
    #[serde(default = "default_subnet_mask")]
    pub subnet_mask: u8,
    #[serde(default)]
    pub gateway_endpoints: Vec<GatewayService>,
}

impl NetworkConfig {
    /// Defaults for a tier: the fixed address block, 2 zones, 1 NAT, and an
    /// S3 endpoint everywhere except Management.
    pub fn for_tier(tier: NetworkTier) -> NetworkConfig {
        let cidr = match tier {
            NetworkTier::Production => PRODUCTION_CIDR,
            NetworkTier::Development => DEVELOPMENT_CIDR,
            NetworkTier::Management => MANAGEMENT_CIDR,
        };
        let gateway_endpoints = match tier {
            NetworkTier::Management => vec![],
            NetworkTier::Production | NetworkTier::Development => vec![GatewayService::S3],
        };
        NetworkConfig {
            name: tier.to_string(),
            cidr,
            tier,
            az_count: DEFAULT_AZ_COUNT,
            nat_gateway_count: DEFAULT_NAT_GATEWAY_COUNT,
            subnet_mask: DEFAULT_SUBNET_MASK,
            gateway_endpoints,
        }
    }
}

/// Full topology settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopologyConfig {
    #[serde(default = "default_region")]
    pub region: String,
    pub networks: Vec<NetworkConfig>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        TopologyConfig {
            region: default_region(),
            networks: NetworkTier::ALL
                .iter()
                .map(|t| NetworkConfig::for_tier(*t))
                .collect(),
        }
    }
}

impl TopologyConfig {
    pub fn network(&self, tier: NetworkTier) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.tier == tier)
    }
}

/// Read a topology config from a JSON file.
///
/// Parse errors carry the path of the offending field, e.g.
/// `networks[1].cidr`.
pub fn load_config(path: &str) -> Result<TopologyConfig, Box<dyn Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading config file {path}: {e}"))?;
    parse_config(&json).map_err(|e| format!("Error parsing config file {path}: {e}").into())
}

/// Parse a topology config from a JSON string.
pub fn parse_config(json: &str) -> Result<TopologyConfig, Box<dyn Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let config: TopologyConfig = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| format!("path={} error={}", e.path(), e.inner()))?;
    log::debug!(
        "Parsed config: region={} networks={}",
        config.region,
        config.networks.len()
    );
    Ok(config)
}

/// Config from the file named by `TOPOLOGY_CONFIG`, or the defaults.
pub fn config_from_env() -> Result<TopologyConfig, Box<dyn Error>> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            log::info!("Using config file from {CONFIG_ENV_VAR}: {path}");
            load_config(&path)
        }
        Err(_) => {
            log::info!("{CONFIG_ENV_VAR} not set, using default topology");
            Ok(TopologyConfig::default())
        }
    }
}
