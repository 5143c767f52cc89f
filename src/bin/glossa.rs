//! Glossa CLI Binary
//!
//! Runs the content generation pipeline over a curriculum.

use anyhow::Context;
use clap::Parser;
use glossa::cli::{exit_hint, format_banner, format_progress, format_summary, map_error, Cli};
use glossa::config::{ConfigLoader, GeneratorConfig};
use glossa::logging::{init_logging, LoggingConfig};
use glossa::pipeline::{Orchestrator, ProgressUpdate, RunOptions};
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %map_error(&e), "Fatal error");
        eprintln!("Fatal error: {}", map_error(&e));
        if let Some(hint) = exit_hint(&e) {
            eprintln!("{}", hint);
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loader = ConfigLoader::from_current_dir()?.with_file(cli.config.clone());
    let config = loader
        .load_validated()
        .context("Failed to load configuration")?;

    let logging_config = build_logging_config(&cli, &config);
    init_logging(Some(&logging_config)).context("Failed to initialize logging")?;
    info!("Glossa CLI starting");

    let options = RunOptions {
        resume: cli.should_resume(),
        dry_run: cli.dry_run,
        topics: cli.topics.clone(),
    };
    let orchestrator = Orchestrator::new(config, options)
        .with_progress_observer(Arc::new(|update: &ProgressUpdate| {
            println!("{}", format_progress(update))
        }));

    if cli.restore_backup {
        orchestrator
            .restore_backup()
            .context("Failed to restore results from backup")?;
        println!(
            "Restored {} from backup",
            orchestrator.config().paths.descriptions.display()
        );
        return Ok(());
    }

    println!(
        "{}",
        format_banner(
            cli.dry_run,
            cli.topics.as_ref().map(Vec::len),
            cli.should_resume()
        )
    );
    let summary = orchestrator.run().await.context("Generation failed")?;
    println!("{}", format_summary(&summary));
    println!(
        "Summary saved to {}",
        orchestrator.config().paths.summary_path().display()
    );
    Ok(())
}

/// Build logging configuration from the config file and CLI flags (flags win)
fn build_logging_config(cli: &Cli, config: &GeneratorConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();

    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.quiet {
        logging.level = "error".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        logging.file = file.clone();
    }
    logging
}
