//! Live-database checks for the article retrieval function.
//!
//! Loads the application from `--app-dir`, connects with its connection
//! config, and runs the article scenario against the `articles` table.
//! Stops at the first failed assertion and exits 1; exits 0 when every
//! assertion passed. Fixture rows are removed either way.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use check_core::config::HarnessConfig;
use check_core::runner::guard;
use check_core::sequence::run_unit_checks;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the unit checks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding index.php and db-config.json
    #[arg(long, default_value = ".")]
    app_dir: PathBuf,

    /// Connection config file (default: <app-dir>/db-config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between the two ordering fixtures in milliseconds
    #[arg(long, default_value_t = 100)]
    order_pause_ms: u64,

    /// Disable ANSI colors (also disabled by NO_COLOR)
    #[arg(long)]
    no_color: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut harness = HarnessConfig::for_app_dir(&args.app_dir);
    if let Some(path) = args.config {
        harness.db_config = path;
    }
    harness.order_pause = Duration::from_millis(args.order_pause_ms);
    harness.color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

    println!("Starting unit tests...");
    println!("{}", "=".repeat(32));

    let outcome = guard(|| {
        let (outcome, summary) = run_unit_checks(&harness, io::stdout());
        tracing::debug!(
            "Unit checks: {} passed, {} failed",
            summary.pass_count,
            summary.fail_count
        );
        outcome
    });

    let mut stdout = io::stdout().lock();
    if let Some(reason) = outcome.reason() {
        writeln!(stdout, "{}", "=".repeat(32))?;
        writeln!(stdout, "Stopped: {}", reason)?;
        stdout.flush()?;
        std::process::exit(1);
    }

    writeln!(stdout, "{}", "=".repeat(32))?;
    writeln!(stdout, "All unit tests passed.")?;
    Ok(())
}
