//! CLI domain: parse, route, output, and presentation only.
//! Route handlers drive the tree's structural operations; no tree logic lives here.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_config, format_list_json, format_list_text, format_tree};
pub use route::RunContext;
