//! The quality run: database probes followed by every static rule.

use std::io::Write;

use crate::artifact::AppLayout;
use crate::config::HarnessConfig;
use crate::outcome::TestOutcome;
use crate::probe::{probe_config_file, ProbeSettings};
use crate::rules::{artifact_names, check_artifact, Rule};
use crate::runner::Runner;

/// Registers and runs the quality tests on `runner`.
///
/// Each artifact is read once and checked with [`check_artifact`]; if it
/// cannot be read, every rule that targets it reports `Error` and the run
/// continues. Failure reasons carry the rule's severity.
pub fn run_quality_checks<W: Write>(
    harness: &HarnessConfig,
    rules: &[Rule],
    runner: &mut Runner<W>,
) {
    let settings = ProbeSettings {
        threshold_ms: harness.latency_threshold_ms,
        query: harness.probe_query.clone(),
    };
    runner.run("Database Connection", || {
        probe_config_file(&harness.db_config, false, &settings)
    });
    runner.run("Database Latency", || {
        probe_config_file(&harness.db_config, true, &settings)
    });

    let layout = AppLayout::new(&harness.app_dir);
    for name in artifact_names(rules) {
        let artifact = match layout.load(name) {
            Ok(artifact) => artifact,
            Err(err) => {
                for rule in rules.iter().filter(|rule| rule.applies(name)) {
                    runner.record(&rule.display_name(name), TestOutcome::error(&err));
                }
                continue;
            }
        };
        for report in check_artifact(&artifact, rules) {
            if !report.outcome.is_pass() {
                tracing::info!(
                    "Rule {} ({}) did not pass on {}",
                    report.rule_id,
                    report.severity,
                    name
                );
            }
            runner.record(&report.name, report.diagnostic());
        }
    }
}
