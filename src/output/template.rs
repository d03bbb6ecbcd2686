//! Synthesized template output.
//!
//! Writes the topology as JSON, the way a provisioning engine would receive
//! it, and reads it back for inspection.

use crate::config::TEMPLATE_TIMEZONE;
use crate::topology::Topology;
use std::error::Error;
use std::path::Path;

/// Default template file name for a given moment, e.g.
/// `topology_synth_2024-03-01.json`.
pub fn template_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "topology_synth_{}.json",
        now.with_timezone(&TEMPLATE_TIMEZONE).format("%Y-%m-%d")
    )
}

/// Write the topology as pretty JSON.
///
/// # Arguments
/// * `topology` - The synthesized topology
/// * `template_file` - Optional output path. If None, uses the dated default name.
///
/// # Returns
/// * `Ok(String)` - The path written
pub fn write_template(
    topology: &Topology,
    template_file: Option<&str>,
) -> Result<String, Box<dyn Error>> {
    let template_file = match template_file {
        Some(file) => file.to_string(),
        None => template_file_name(chrono::Utc::now()),
    };
    let json = serde_json::to_string_pretty(topology)
        .map_err(|e| format!("Error serializing topology: {e}"))?;
    if Path::new(&template_file).exists() {
        log::warn!("Overwriting template file: {template_file}");
    }
    std::fs::write(&template_file, json)
        .map_err(|e| format!("Error writing template file {template_file}: {e}"))?;
    log::info!("Wrote template file: {template_file}");
    Ok(template_file)
}

/// Read a previously written template.
pub fn read_template(template_file: &str) -> Result<Topology, Box<dyn Error>> {
    if !Path::new(template_file).exists() {
        return Err(format!("Template file does not exist: {template_file}").into());
    }
    let json = std::fs::read_to_string(template_file)?;
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let topology = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        format!(
            "Error parsing template {template_file}: path={} error={}",
            e.path(),
            e.inner()
        )
    })?;
    Ok(topology)
}
