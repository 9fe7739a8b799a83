//! CLI domain: parse, route, output, and presentation only.
//! No conversion logic; the route hands a configured pipeline to the library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, OutputFormat};
pub use presentation::{
    format_malformed_lines, format_outcome, format_prepared_json, format_report_text,
    render_diff_line,
};
pub use route::{build_config, RunContext};
