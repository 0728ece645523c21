//! Injection and query-shape heuristics.

use regex::Regex;

use crate::error::Result;
use crate::outcome::TestOutcome;

/// Fails on a short echo that prints a mapped field directly, e.g.
/// `<?= $article['title'] ?>`. Wrapping the field in `htmlspecialchars(...)`
/// puts a call between `<?=` and the variable, which no longer matches.
pub fn check_unescaped_output(text: &str) -> Result<TestOutcome> {
    let echo_re = Regex::new(r"<\?=\s*\$([A-Za-z_][A-Za-z0-9_]*)\s*\[")?;

    if let Some(caps) = echo_re.captures(text) {
        return Ok(TestOutcome::fail(format!(
            "Found potential XSS vulnerability: Outputting ${} data without htmlspecialchars()",
            &caps[1]
        )));
    }
    Ok(TestOutcome::Pass)
}

/// A quoted string found in PHP code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Literal<'a> {
    body: &'a str,
    double_quoted: bool,
    /// Byte offset just past the closing quote
    end: usize,
}

/// Quoted strings in PHP code, in source order.
///
/// Text outside `<?php ... ?>` / `<?= ... ?>` blocks and `//`, `#` and
/// `/* */` comments are skipped, so an apostrophe in markup or in a
/// comment never opens a literal. Text without any open tag is read as
/// code from the start.
fn php_literals(text: &str) -> Vec<Literal<'_>> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut literals = Vec::new();
    let mut in_code = !text.contains("<?");
    let mut i = 0;

    while i < len {
        let rest = &bytes[i..];
        if !in_code {
            if rest.starts_with(b"<?") {
                in_code = true;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        match bytes[i] {
            b'?' if rest.starts_with(b"?>") => {
                in_code = false;
                i += 2;
            }
            b'/' if rest.starts_with(b"//") => i = line_comment_end(bytes, i),
            b'#' => i = line_comment_end(bytes, i),
            b'/' if rest.starts_with(b"/*") => {
                i = find(bytes, i + 2, b"*/").map_or(len, |pos| pos + 2);
            }
            quote @ (b'"' | b'\'') => {
                let start = i + 1;
                let mut j = start;
                while j < len && bytes[j] != quote {
                    j += if bytes[j] == b'\\' { 2 } else { 1 };
                }
                let close = j.min(len);
                literals.push(Literal {
                    body: &text[start..close],
                    double_quoted: quote == b'"',
                    end: (close + 1).min(len),
                });
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    literals
}

/// A line comment runs to the newline or to the closing `?>`.
fn line_comment_end(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() && bytes[i] != b'\n' && !bytes[i..].starts_with(b"?>") {
        i += 1;
    }
    i
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| from + pos)
}

/// Fails when a string literal holding a SQL statement also takes a raw
/// variable, either interpolated inside a double-quoted literal or
/// concatenated right after the literal.
///
/// Named (`:id`) and positional (`?`) placeholders are not variables, so
/// prepared statements pass.
pub fn check_sql_interpolation(text: &str) -> Result<TestOutcome> {
    let statement_re = Regex::new(
        r"(?is)\b(?:select\b.+\bfrom|insert\s+into|update\b.+\bset|delete\s+from)\b",
    )?;
    let interpolated_re = Regex::new(r"(?:^|[^\\])\{?\$([A-Za-z_][A-Za-z0-9_]*)")?;
    let concatenated_re = Regex::new(r"^\s*\.\s*\$([A-Za-z_][A-Za-z0-9_]*)")?;

    for literal in php_literals(text) {
        if !statement_re.is_match(literal.body) {
            continue;
        }

        let interpolated = if literal.double_quoted {
            interpolated_re
                .captures(literal.body)
                .map(|v| v[1].to_string())
        } else {
            None
        };
        let variable = interpolated.or_else(|| {
            concatenated_re
                .captures(&text[literal.end..])
                .map(|v| v[1].to_string())
        });

        if let Some(variable) = variable {
            return Ok(TestOutcome::fail(format!(
                "Found potential SQL injection: variable ${} interpolated into SQL string",
                variable
            )));
        }
    }

    Ok(TestOutcome::Pass)
}

/// Fails on a wildcard column list.
pub fn check_select_star(text: &str) -> Result<TestOutcome> {
    let star_re = Regex::new(r"(?i)\bselect\s+\*\s+from\b")?;

    Ok(TestOutcome::check(
        !star_re.is_match(text),
        "Found anti-pattern: SELECT * FROM (list the needed columns instead)",
    ))
}
