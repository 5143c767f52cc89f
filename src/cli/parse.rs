//! CLI parse: clap types for glossa. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Generate curriculum topic descriptions into the web UI's data file
#[derive(Parser, Debug)]
#[command(name = "glossa")]
#[command(about = "Resumable batch generator of curriculum topic descriptions")]
pub struct Cli {
    /// Configuration file path (default: glossa.toml in the working directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resume from previous progress (default behavior)
    #[arg(long, conflicts_with = "no_resume")]
    pub resume: bool,

    /// Start fresh, resetting previous progress
    #[arg(long)]
    pub no_resume: bool,

    /// Generate and validate without writing results or progress
    #[arg(long)]
    pub dry_run: bool,

    /// Process only these topic ids (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = parse_topic_id)]
    pub topics: Option<Vec<String>>,

    /// Restore the results file from its backup and exit
    #[arg(long, conflicts_with_all = ["dry_run", "topics", "no_resume"])]
    pub restore_backup: bool,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn should_resume(&self) -> bool {
        !self.no_resume
    }
}

fn parse_topic_id(value: &str) -> Result<String, String> {
    let id = value.trim();
    if id.is_empty() {
        Err("topic ids must be non-empty".to_string())
    } else {
        Ok(id.to_string())
    }
}
