//! Database probe outcomes.

use ntest::timeout;

use check_core::config::{ConnectionConfig, DB_CONFIG_FILE};
use check_core::probe::{probe, probe_config_file, ProbeSettings};
use check_core::TestOutcome;

use crate::helpers::{sqlite_dsn, TestApp};

fn fail_reason(outcome: TestOutcome) -> String {
    match outcome {
        TestOutcome::Fail(reason) => reason,
        other => panic!("expected Fail, got {:?}", other),
    }
}

fn generous() -> ProbeSettings {
    ProbeSettings {
        threshold_ms: 5_000,
        ..Default::default()
    }
}

#[timeout(5000)]
#[test]
fn test_unreachable_dsn_fails_without_fault() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConnectionConfig::new(sqlite_dsn(&dir.path().join("missing/blog.db")));

    let reason = fail_reason(probe(&config, true, &generous()));
    assert!(reason.starts_with("Connection failed: "), "{}", reason);
}

#[timeout(5000)]
#[test]
fn test_unsupported_driver_is_connection_failure() {
    let config = ConnectionConfig::new("mysql:host=localhost;dbname=blog");
    let reason = fail_reason(probe(&config, false, &generous()));
    assert_eq!(reason, "Connection failed: Unsupported driver 'mysql'");
}

#[timeout(5000)]
#[test]
fn test_reachable_store_passes() {
    let app = TestApp::clean();
    let config = ConnectionConfig::new(sqlite_dsn(&app.db_path));

    assert_eq!(probe(&config, false, &generous()), TestOutcome::Pass);
    assert_eq!(probe(&config, true, &generous()), TestOutcome::Pass);
}

#[timeout(20000)]
#[test]
fn test_slow_query_exceeds_threshold() {
    let app = TestApp::clean();
    let config = ConnectionConfig::new(sqlite_dsn(&app.db_path));
    let settings = ProbeSettings {
        threshold_ms: 1,
        query: "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 3000000) \
                SELECT COUNT(x) FROM c"
            .to_string(),
    };

    let reason = fail_reason(probe(&config, true, &settings));
    assert!(reason.starts_with("Too slow: "), "{}", reason);
    assert!(reason.ends_with("(Limit: 1ms)"), "{}", reason);

    // Latency is only judged when a query runs
    assert_eq!(probe(&config, false, &settings), TestOutcome::Pass);
}

#[timeout(5000)]
#[test]
fn test_broken_query_fails() {
    let app = TestApp::clean();
    let config = ConnectionConfig::new(sqlite_dsn(&app.db_path));
    let settings = ProbeSettings {
        query: "SELECT nope FROM nowhere".to_string(),
        ..generous()
    };

    let reason = fail_reason(probe(&config, true, &settings));
    assert!(reason.starts_with("Query failed: "), "{}", reason);
}

#[timeout(5000)]
#[test]
fn test_missing_config_is_distinct_failure() {
    let app = TestApp::clean();
    app.remove(DB_CONFIG_FILE);

    let reason = fail_reason(probe_config_file(
        &app.dir.path().join(DB_CONFIG_FILE),
        false,
        &generous(),
    ));
    assert!(reason.ends_with("db-config.json missing"), "{}", reason);
}

#[timeout(5000)]
#[test]
fn test_config_without_dsn_fails() {
    let app = TestApp::clean();
    app.write_config(r#"{ "user": "blog" }"#);

    let reason = fail_reason(probe_config_file(
        &app.dir.path().join(DB_CONFIG_FILE),
        true,
        &generous(),
    ));
    assert_eq!(reason, "dsn not defined");
}

#[timeout(5000)]
#[test]
fn test_config_file_probe_passes() {
    let app = TestApp::clean();
    let outcome = probe_config_file(&app.dir.path().join(DB_CONFIG_FILE), true, &generous());
    assert_eq!(outcome, TestOutcome::Pass);
}
