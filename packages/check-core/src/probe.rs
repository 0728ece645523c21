//! Database connectivity and latency probe.

use std::path::Path;
use std::time::Instant;

use crate::config::ConnectionConfig;
use crate::connection;
use crate::error::CheckError;
use crate::outcome::TestOutcome;

/// Probe settings.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Latency limit in milliseconds
    pub threshold_ms: u64,
    /// Round-trip statement run when a query is requested
    pub query: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            threshold_ms: 100,
            query: "SELECT 1".to_string(),
        }
    }
}

/// Opens a connection and, with `with_query`, times connect plus one
/// round-trip statement against the threshold.
///
/// Never returns `Error`: every fault on the way is a `Fail` with the
/// reason prefixed by the step that broke.
pub fn probe(
    config: &ConnectionConfig,
    with_query: bool,
    settings: &ProbeSettings,
) -> TestOutcome {
    let start = Instant::now();

    let conn = match connection::open(config) {
        Ok(conn) => conn,
        Err(err) => {
            return TestOutcome::Fail(format!(
                "Connection failed: {}",
                connection_detail(&err)
            ))
        }
    };

    if !with_query {
        return TestOutcome::Pass;
    }

    // Drain every row so the timing covers the whole statement.
    let query_result = conn.prepare(&settings.query).and_then(|mut stmt| {
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        Ok(())
    });
    if let Err(err) = query_result {
        return TestOutcome::Fail(format!("Query failed: {}", err));
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(
        "Probe round-trip took {:.2}ms (limit {}ms)",
        elapsed_ms,
        settings.threshold_ms
    );
    if elapsed_ms > settings.threshold_ms as f64 {
        TestOutcome::Fail(format!(
            "Too slow: {:.2}ms (Limit: {}ms)",
            elapsed_ms, settings.threshold_ms
        ))
    } else {
        TestOutcome::Pass
    }
}

/// Loads the connection config from `path`, then probes.
///
/// A missing config file or an undefined DSN is a `Fail` naming the
/// problem, not a fault.
pub fn probe_config_file(
    path: &Path,
    with_query: bool,
    settings: &ProbeSettings,
) -> TestOutcome {
    match ConnectionConfig::load(path) {
        Ok(config) => probe(&config, with_query, settings),
        Err(err @ (CheckError::ConfigNotFound(_) | CheckError::MissingSetting(_))) => {
            TestOutcome::Fail(err.to_string())
        }
        Err(err) => TestOutcome::Fail(format!("Connection failed: {}", err)),
    }
}

fn connection_detail(err: &CheckError) -> String {
    match err {
        CheckError::Database(detail) => detail.clone(),
        other => other.to_string(),
    }
}
