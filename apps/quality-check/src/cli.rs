use std::path::PathBuf;

use check_core::config::HarnessConfig;
use clap::Parser;

/// Static quality rules and database probe for the blog application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding index.php, validation.php and db-config.json
    #[arg(long, default_value = ".")]
    pub app_dir: PathBuf,

    /// Connection config file (default: <app-dir>/db-config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Probe latency limit in milliseconds
    #[arg(long, default_value_t = 100)]
    pub latency_threshold_ms: u64,

    /// Round-trip statement used by the latency probe
    #[arg(long, default_value = "SELECT 1")]
    pub probe_query: String,

    /// Disable ANSI colors (also disabled by NO_COLOR)
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn harness_config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::for_app_dir(&self.app_dir);
        if let Some(path) = &self.config {
            config.db_config = path.clone();
        }
        config.latency_threshold_ms = self.latency_threshold_ms;
        config.probe_query = self.probe_query.clone();
        config.color = !self.no_color && std::env::var_os("NO_COLOR").is_none();
        config
    }
}
