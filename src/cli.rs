//! CLI domain: parse, output and presentation only.
//! The binary wires these to the orchestrator.

mod output;
mod parse;
mod presentation;

pub use output::{exit_hint, map_error};
pub use parse::Cli;
pub use presentation::{
    format_banner, format_progress, format_summary, format_verification,
};
