//! Rule registry and static checker.
//!
//! Every rule is a literal text heuristic over one artifact's source. The
//! rules target specific defect shapes (a heading closed before its inner
//! tag, an echoed `$row[...]` without escaping, SQL assembled from
//! variables) and make no attempt at general markup or PHP parsing, so
//! deeply nested or unusual sources can still produce false positives.

mod logic;
mod markup;
mod security;


use std::fmt;

use crate::artifact::{Artifact, INDEX, VALIDATION};
use crate::error::Result;
use crate::outcome::TestOutcome;
use crate::runner::guard;

pub use logic::check_fallback_field;
pub use markup::{check_heading_nesting, check_reopened_tag};
pub use security::{check_select_star, check_sql_interpolation, check_unescaped_output};

/// Predicate over artifact text. `Err` means the rule could not run.
pub type Matcher = fn(&str) -> Result<TestOutcome>;

/// How seriously a failing rule should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Correctness or security defect
    Error,
    /// Performance or style heuristic
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A named, stateless predicate bound to the artifacts it checks.
#[derive(Clone)]
pub struct Rule {
    pub id: &'static str,
    pub title: &'static str,
    pub applies_to: &'static [&'static str],
    pub severity: Severity,
    pub matcher: Matcher,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("applies_to", &self.applies_to)
            .field("severity", &self.severity)
            .finish()
    }
}

impl Rule {
    pub fn applies(&self, artifact_name: &str) -> bool {
        self.applies_to.iter().any(|name| *name == artifact_name)
    }

    /// Runs the matcher; a matcher fault or panic becomes `TestOutcome::Error`.
    pub fn evaluate(&self, text: &str) -> TestOutcome {
        let outcome = guard(|| (self.matcher)(text));
        tracing::debug!("Rule {} evaluated: {}", self.id, outcome);
        outcome
    }

    /// Report name for this rule on one artifact, e.g. `index.php HTML Nesting`.
    pub fn display_name(&self, artifact_name: &str) -> String {
        format!("{}.php {}", artifact_name, self.title)
    }
}

/// Outcome of one rule against one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    pub rule_id: &'static str,
    pub name: String,
    pub severity: Severity,
    pub outcome: TestOutcome,
}

impl RuleReport {
    /// The outcome as printed, a failure reason led by the rule's severity,
    /// e.g. `[warning] Found anti-pattern: ...`.
    pub fn diagnostic(&self) -> TestOutcome {
        match &self.outcome {
            TestOutcome::Fail(reason) => {
                TestOutcome::Fail(format!("[{}] {}", self.severity, reason))
            }
            other => other.clone(),
        }
    }
}

/// The fixed rule set.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "html-nesting",
            title: "HTML Nesting",
            applies_to: &[INDEX],
            severity: Severity::Error,
            matcher: check_heading_nesting,
        },
        Rule {
            id: "html-unclosed-tag",
            title: "HTML Unclosed Tags",
            applies_to: &[INDEX],
            severity: Severity::Error,
            matcher: check_reopened_tag,
        },
        Rule {
            id: "xss-unescaped-output",
            title: "Security (XSS)",
            applies_to: &[INDEX],
            severity: Severity::Error,
            matcher: check_unescaped_output,
        },
        Rule {
            id: "sql-interpolation",
            title: "Security (SQL Injection)",
            applies_to: &[INDEX, VALIDATION],
            severity: Severity::Error,
            matcher: check_sql_interpolation,
        },
        Rule {
            id: "select-star",
            title: "Performance (SELECT *)",
            applies_to: &[INDEX],
            severity: Severity::Warning,
            matcher: check_select_star,
        },
        Rule {
            id: "fallback-field",
            title: "Logic (Author Check)",
            applies_to: &[VALIDATION],
            severity: Severity::Error,
            matcher: check_fallback_field,
        },
    ]
}

/// Applies every rule that targets `artifact`, one report per rule.
pub fn check_artifact(artifact: &Artifact, rules: &[Rule]) -> Vec<RuleReport> {
    rules
        .iter()
        .filter(|rule| rule.applies(&artifact.name))
        .map(|rule| RuleReport {
            rule_id: rule.id,
            name: rule.display_name(&artifact.name),
            severity: rule.severity,
            outcome: rule.evaluate(&artifact.source_text),
        })
        .collect()
}

/// Artifact names targeted by at least one rule, in registry order.
pub fn artifact_names(rules: &[Rule]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for name in rules.iter().flat_map(|rule| rule.applies_to.iter()) {
        if !names.contains(name) {
            names.push(*name);
        }
    }
    names
}
