//! Three-way result of a single check.

use std::fmt;

/// Result of one test, rule or probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// Check held
    Pass,
    /// Check evaluated false; carries the diagnostic
    Fail(String),
    /// Check could not be evaluated (I/O, database fault, panic)
    Error(String),
}

impl TestOutcome {
    /// Creates a failure with the given reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        TestOutcome::Fail(reason.into())
    }

    /// Creates an error outcome from any displayable fault.
    pub fn error(fault: impl fmt::Display) -> Self {
        TestOutcome::Error(fault.to_string())
    }

    /// Pass when `condition` holds, otherwise `Fail(reason)`.
    pub fn check(condition: bool, reason: impl Into<String>) -> Self {
        if condition {
            TestOutcome::Pass
        } else {
            TestOutcome::Fail(reason.into())
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, TestOutcome::Pass)
    }

    /// Diagnostic for failures and errors, `None` on pass.
    pub fn reason(&self) -> Option<&str> {
        match self {
            TestOutcome::Pass => None,
            TestOutcome::Fail(reason) | TestOutcome::Error(reason) => Some(reason),
        }
    }

    /// Status marker printed by the reporter.
    pub fn label(&self) -> &'static str {
        match self {
            TestOutcome::Pass => "PASS",
            TestOutcome::Fail(_) => "FAIL",
            TestOutcome::Error(_) => "ERROR",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {}", self.label(), reason),
            None => f.write_str(self.label()),
        }
    }
}

/// Faults returned by a test action are reported as `Error`.
impl<E: fmt::Display> From<Result<TestOutcome, E>> for TestOutcome {
    fn from(result: Result<TestOutcome, E>) -> Self {
        result.unwrap_or_else(TestOutcome::error)
    }
}
