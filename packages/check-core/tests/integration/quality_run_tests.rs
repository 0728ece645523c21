//! Full quality runs: probes plus rules, report text and exit codes.

use ntest::timeout;

use check_core::config::HarnessConfig;
use check_core::quality::run_quality_checks;
use check_core::rules::default_rules;
use check_core::{RunSummary, Runner};

use crate::helpers::{TestApp, CLEAN_INDEX, CLEAN_VALIDATION};

fn run(harness: &HarnessConfig) -> (RunSummary, String) {
    let mut runner = Runner::new(Vec::new(), false);
    runner.banner("Starting Quality Code Tests");
    run_quality_checks(harness, &default_rules(), &mut runner);
    let (summary, buf) = runner.finish();
    (summary, String::from_utf8(buf).unwrap())
}

#[timeout(5000)]
#[test]
fn test_clean_app_exits_zero() {
    let app = TestApp::clean();
    let (summary, output) = run(&app.harness());

    assert_eq!(summary.fail_count, 0, "{}", output);
    // 2 probes + 5 index rules + 2 validation rules
    assert_eq!(summary.pass_count, 9);
    assert_eq!(summary.exit_code(), 0);
    assert!(output.contains("TEST: Database Connection ... PASS"));
    assert!(output.contains("TEST: index.php HTML Nesting ... PASS"));
    assert!(output.contains("TEST: validation.php Logic (Author Check) ... PASS"));
    assert!(output.ends_with("Tests Completed: 9 Passed, 0 Failed.\n"));
}

#[timeout(5000)]
#[test]
fn test_single_bad_rule_exits_one() {
    let index = CLEAN_INDEX.replace(
        "<cite><?= htmlspecialchars($article['author']) ?></cite>",
        "<cite><?= htmlspecialchars($article['author']) ?><cite>",
    );
    let app = TestApp::new(&index, CLEAN_VALIDATION);
    let (summary, output) = run(&app.harness());

    assert_eq!(summary.fail_count, 1, "{}", output);
    assert_eq!(summary.exit_code(), 1);
    assert!(output.contains(
        "TEST: index.php HTML Unclosed Tags ... FAIL\n  -> [error] Found invalid closing tag: <cite> used instead of </cite>\n"
    ));
}

#[timeout(5000)]
#[test]
fn test_every_defect_reported_in_one_run() {
    let index = r#"<?php
$rows = $pdo->query("SELECT * FROM articles WHERE author = '" . $author . "'");
?>
<h2><small><?= $article['title'] ?></h2></small>
"#;
    let validation = r#"<?php
} elseif (!isset($_POST["title"]) || empty($_POST["author"])) {
"#;
    let app = TestApp::new(index, validation);
    let (summary, output) = run(&app.harness());

    assert_eq!(summary.pass_count, 4, "{}", output);
    assert_eq!(summary.fail_count, 5);
    assert!(output.contains("Found invalid nesting: <h2> closed before <small>"));
    assert!(output.contains("Found potential XSS vulnerability"));
    assert!(output.contains("Found potential SQL injection: variable $author"));
    assert!(output.contains(
        "TEST: index.php Performance (SELECT *) ... FAIL\n  -> [warning] Found anti-pattern: SELECT * FROM"
    ));
    assert!(output.contains("  -> [error] Found potential XSS vulnerability"));
    assert!(output.contains("Found logic error: checking 'title' instead of 'author'"));
}

#[timeout(5000)]
#[test]
fn test_commented_index_still_reports_injection() {
    let index = format!(
        "<h1>L'actualité</h1>\n<?php\n// Récupération de l'article\n$rows = $pdo->query(\"SELECT id FROM articles WHERE author = '\" . $author . \"'\");\n?>\n{}",
        CLEAN_INDEX
    );
    let app = TestApp::new(&index, CLEAN_VALIDATION);
    let (summary, output) = run(&app.harness());

    assert_eq!(summary.fail_count, 1, "{}", output);
    assert!(output.contains(
        "TEST: index.php Security (SQL Injection) ... FAIL\n  -> [error] Found potential SQL injection: variable $author"
    ));
}

#[timeout(5000)]
#[test]
fn test_missing_config_fails_probes_but_rules_still_run() {
    let app = TestApp::clean();
    app.remove("db-config.json");
    let (summary, output) = run(&app.harness());

    assert_eq!(summary.fail_count, 2);
    assert_eq!(summary.pass_count, 7);
    assert!(output.contains("TEST: Database Connection ... FAIL\n  -> "));
    assert!(output.contains("db-config.json missing"));
}

#[timeout(5000)]
#[test]
fn test_unreadable_artifact_is_error_per_rule() {
    let app = TestApp::clean();
    app.remove("validation.php");
    let (summary, output) = run(&app.harness());

    assert_eq!(summary.fail_count, 2);
    assert!(output.contains("TEST: validation.php Security (SQL Injection) ... ERROR"));
    assert!(output.contains("TEST: validation.php Logic (Author Check) ... ERROR"));
    assert!(output.contains("Unable to read artifact 'validation'"));
}

#[timeout(20000)]
#[test]
fn test_slow_store_fails_latency_only() {
    let app = TestApp::clean();
    let harness = HarnessConfig {
        latency_threshold_ms: 1,
        probe_query: "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 3000000) \
                      SELECT COUNT(x) FROM c"
            .to_string(),
        ..app.harness()
    };
    let (summary, output) = run(&harness);

    assert_eq!(summary.fail_count, 1);
    assert!(output.contains("TEST: Database Latency ... FAIL\n  -> Too slow: "));
}
