//! Output formatting for the synthesized topology.
//!
//! - [`csv`] - route fabric as CSV
//! - [`template`] - JSON template file
//! - [`terminal`] - terminal summary with colors

mod csv;
mod template;
mod terminal;

pub use csv::{route_print, route_row};
pub use template::{read_template, template_file_name, write_template};
pub use terminal::{format_field, print_summary, summary_lines};
