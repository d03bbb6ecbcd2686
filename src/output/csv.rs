//! CSV output of the route fabric.

use super::terminal::format_field;
use crate::models::RouteEntry;
use crate::topology::Topology;
use itertools::Itertools;

const HEADER: &str = r#""cnt","route_id","source","tier","route_table","destination","destination_cidr","peering_link""#;

/// One CSV row for a route entry.
pub fn route_row(index: usize, route: &RouteEntry) -> String {
    [
        format_field(index, 5),
        format_field(&route.id, 22),
        format_field(route.source, 13),
        format_field(route.source_tier, 10),
        format_field(&route.route_table_id, 40),
        format_field(route.destination, 13),
        format_field(route.destination_cidr, 16),
        format_field(&route.peering_link, 15),
    ]
    .iter()
    .join(",")
}

/// Print the route entries as CSV to stdout.
pub fn route_print(topology: &Topology) {
    log::info!("#Start route_print() {} routes", topology.routes.len());
    println!("{HEADER}");
    for (i, route) in topology.routes.iter().enumerate() {
        println!("{}", route_row(i + 1, route));
    }
}
