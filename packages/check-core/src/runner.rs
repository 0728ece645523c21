//! Named test execution, outcome accounting and console reporting.

use std::io::Write;
use std::panic::AssertUnwindSafe;

use crate::outcome::TestOutcome;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Pass/fail tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pass_count: usize,
    pub fail_count: usize,
}

impl RunSummary {
    /// Counts one outcome. Errors are failures.
    pub fn record(&mut self, outcome: &TestOutcome) {
        if outcome.is_pass() {
            self.pass_count += 1;
        } else {
            self.fail_count += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.pass_count + self.fail_count
    }

    pub fn all_passed(&self) -> bool {
        self.fail_count == 0
    }

    /// Process exit status: 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Runs `action`, turning a panic into `TestOutcome::Error`.
pub fn guard<F, O>(action: F) -> TestOutcome
where
    F: FnOnce() -> O,
    O: Into<TestOutcome>,
{
    match std::panic::catch_unwind(AssertUnwindSafe(|| action().into())) {
        Ok(outcome) => outcome,
        Err(panic) => {
            let panic_msg = if let Some(msg) = panic.downcast_ref::<&str>() {
                msg.to_string()
            } else if let Some(msg) = panic.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            tracing::error!("Test action panicked: {}", panic_msg);
            TestOutcome::Error(format!("panicked: {}", panic_msg))
        }
    }
}

/// Wraps a status marker in green or red when color is on.
fn paint(text: &str, pass: bool, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let code = if pass { GREEN } else { RED };
    format!("{}{}{}", code, text, RESET)
}

/// Sequential test runner writing a line-oriented report.
///
/// Each test prints its name before the action runs, then a status
/// marker, then a `  -> reason` line on failure. One failing or
/// panicking test never stops the run.
pub struct Runner<W: Write> {
    out: W,
    color: bool,
    summary: RunSummary,
}

impl<W: Write> Runner<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            summary: RunSummary::default(),
        }
    }

    /// Prints a title followed by a rule line.
    pub fn banner(&mut self, title: &str) {
        let _ = writeln!(self.out, "{}", title);
        let _ = writeln!(self.out, "{}", "=".repeat(title.len()));
    }

    /// Executes one named test and records its outcome.
    pub fn run<F, O>(&mut self, name: &str, action: F) -> TestOutcome
    where
        F: FnOnce() -> O,
        O: Into<TestOutcome>,
    {
        let _ = write!(self.out, "TEST: {} ... ", name);
        let _ = self.out.flush();

        let outcome = guard(action);
        self.report(name, &outcome);
        outcome
    }

    /// Records an outcome produced elsewhere, printing the same lines as `run`.
    pub fn record(&mut self, name: &str, outcome: TestOutcome) -> TestOutcome {
        let _ = write!(self.out, "TEST: {} ... ", name);
        self.report(name, &outcome);
        outcome
    }

    fn report(&mut self, name: &str, outcome: &TestOutcome) {
        self.summary.record(outcome);
        let _ = writeln!(
            self.out,
            "{}",
            paint(outcome.label(), outcome.is_pass(), self.color)
        );
        if let Some(reason) = outcome.reason() {
            tracing::debug!("{} -> {}", name, reason);
            let _ = writeln!(self.out, "  -> {}", reason);
        }
        let _ = self.out.flush();
    }

    /// Records one assertion of a stepwise scenario as `[LABEL] name`.
    pub fn step(&mut self, name: &str, outcome: &TestOutcome) {
        self.summary.record(outcome);
        let marker = paint(
            &format!("[{}]", outcome.label()),
            outcome.is_pass(),
            self.color,
        );
        let _ = writeln!(self.out, "{} {}", marker, name);
    }

    /// Prints a plain progress line.
    pub fn note(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Hands back the writer without printing totals.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints the totals line and hands back the tallies and the writer.
    pub fn finish(mut self) -> (RunSummary, W) {
        let _ = writeln!(self.out, "{}", "=".repeat(27));
        let _ = writeln!(
            self.out,
            "Tests Completed: {} Passed, {} Failed.",
            self.summary.pass_count, self.summary.fail_count
        );
        let _ = self.out.flush();
        (self.summary, self.out)
    }
}
