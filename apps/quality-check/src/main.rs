//! Quality checks for the blog application.
//!
//! Runs, in order:
//! - Database connection and latency probes
//! - Static rules over index.php and validation.php
//!
//! Exits 0 when everything passed, 1 otherwise.

mod cli;

use std::io;

use check_core::quality::run_quality_checks;
use check_core::rules::default_rules;
use check_core::Runner;
use clap::Parser;
use cli::Args;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let harness = args.harness_config();
    tracing::debug!("Harness config: {:?}", harness);

    let stdout = io::stdout();
    let mut runner = Runner::new(stdout.lock(), harness.color);
    runner.banner("Starting Quality Code Tests");
    run_quality_checks(&harness, &default_rules(), &mut runner);
    let (summary, _) = runner.finish();

    std::process::exit(summary.exit_code());
}
