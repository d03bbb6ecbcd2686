// cargo watch -x 'fmt' -x 'run'

pub mod config;
pub mod fabric;
pub mod models;
pub mod output;
pub mod topology;

use config::TopologyConfig;
use fabric::TopologyPolicy;
use std::error::Error;
use topology::Topology;

pub use topology::build_topology;

/// Build and validate the topology for a config under the default policy.
pub fn synthesize(config: &TopologyConfig) -> Result<Topology, Box<dyn Error>> {
    let topology = build_topology(config, &TopologyPolicy::default())?;
    if !topology.flow_log_failures.is_empty() {
        log::warn!(
            "Synthesized with {} flow log failure(s)",
            topology.flow_log_failures.len()
        );
    }
    Ok(topology)
}

/// Synthesize from a config file, or from the defaults when `config_file` is None.
pub fn synthesize_from(config_file: Option<&str>) -> Result<Topology, Box<dyn Error>> {
    let config = match config_file {
        Some(file) => config::load_config(file)?,
        None => TopologyConfig::default(),
    };
    synthesize(&config)
}
