//! Terminal output utilities.
//!
//! Provides formatting helpers and a colored topology summary.

use crate::models::Reachability;
use crate::topology::Topology;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

fn reachability_label(reachability: Reachability) -> String {
    match reachability {
        Reachability::InternetFacing => "internet".green().to_string(),
        Reachability::OutboundOnly => "nat-only".yellow().to_string(),
        Reachability::NoEgress => "no-egress".red().to_string(),
    }
}

/// Summary lines for a topology, one block per network then the links.
pub fn summary_lines(topology: &Topology) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Topology {} ({} networks, {} subnets)",
        topology.region.bold(),
        topology.networks.len(),
        topology.subnet_count()
    ));
    for network in &topology.networks {
        lines.push(format!("NETWORK: {network}"));
        if let Some(resolver) = network.resolver_address {
            lines.push(format!("  resolver {resolver}"));
        }
        for subnet in &network.subnets {
            lines.push(format!(
                "  {:<32} {:<18} {:<12} {}",
                subnet.id,
                subnet.cidr.to_string(),
                subnet.zone,
                reachability_label(subnet.tier.reachability())
            ));
        }
    }
    for link in &topology.peering_links {
        let count = topology.routes_between(link.first, link.second).len();
        lines.push(format!("PEERING: {link} - {count} routes"));
    }
    for failure in &topology.flow_log_failures {
        lines.push(format!("{} flow log {failure}", "FAILED".on_red()));
    }
    lines
}

/// Print a topology summary to stdout.
pub fn print_summary(topology: &Topology) {
    log::info!("#Start print_summary()");
    for line in summary_lines(topology) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use crate::fabric::TopologyPolicy;
    use crate::topology::build_topology;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }

    #[test]
    fn test_summary_lines() {
        colored::control::set_override(false);
        let topology =
            build_topology(&TopologyConfig::default(), &TopologyPolicy::default()).unwrap();
        let lines = summary_lines(&topology);
        // header + 3 networks + 16 subnets + 1 resolver + 2 links
        assert_eq!(lines.len(), 1 + 3 + 16 + 1 + 2);
        assert!(lines.iter().any(|l| l == "  resolver 10.70.0.2"));
        assert!(lines.iter().any(|l| {
            l.starts_with("PEERING: Development <-> Management") && l.ends_with("10 routes")
        }));
        assert!(!lines.iter().any(|l| l.starts_with("FAILED")));
    }

    #[test]
    fn test_summary_lines_report_flow_log_failures() {
        colored::control::set_override(false);
        let mut topology =
            build_topology(&TopologyConfig::default(), &TopologyPolicy::default()).unwrap();
        topology
            .flow_log_failures
            .push("Development: duplicate resource DevelopmentVpcLogGroup".to_string());
        let lines = summary_lines(&topology);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("FAILED flow log Development: duplicate resource DevelopmentVpcLogGroup")
        );
    }
}
