//! Form validation logic heuristics.

use regex::Regex;

use crate::error::Result;
use crate::outcome::TestOutcome;

/// Fails on a fallback branch whose `isset` and `empty` tests name
/// different form fields, e.g.
/// `elseif (!isset($_POST["title"]) || empty($_POST["author"]))`.
/// Both halves of a required-field check must test the same field, and a
/// mismatch means the branch re-checks a field an earlier branch covered.
pub fn check_fallback_field(text: &str) -> Result<TestOutcome> {
    let branch_re = Regex::new(
        r#"else\s*if\s*\(\s*!\s*isset\s*\(\s*\$_POST\s*\[\s*["']([^"']+)["']\s*\]\s*\)\s*\|\|\s*empty\s*\(\s*\$_POST\s*\[\s*["']([^"']+)["']\s*\]\s*\)\s*\)"#,
    )?;

    for caps in branch_re.captures_iter(text) {
        let checked = &caps[1];
        let required = &caps[2];
        if checked != required {
            return Ok(TestOutcome::fail(format!(
                "Found logic error: checking '{}' instead of '{}' in elseif block",
                checked, required
            )));
        }
    }

    Ok(TestOutcome::Pass)
}
