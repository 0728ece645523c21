//! Markup structure heuristics.

use std::collections::HashMap;

use regex::Regex;

use crate::error::Result;
use crate::outcome::TestOutcome;

/// Elements that never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that may not contain another element of the same name.
const NON_NESTING: &[&str] = &[
    "a", "button", "cite", "h1", "h2", "h3", "h4", "h5", "h6", "label", "option", "p", "small",
    "textarea", "title",
];

/// Opening or closing tag: group 1 is `/` for a close, group 2 the name.
const TAG_PATTERN: &str = r"<(/?)([a-z][a-z0-9]*)\b[^>]*>";

/// Fails when a heading closes while an inline tag opened inside it is
/// still open, e.g. `<h2><small>X</h2></small>`.
///
/// An inner tag counts as closed when the heading body holds at least as
/// many closes as opens for it, so `<h2>A <small>b</small></h2>` passes.
pub fn check_heading_nesting(text: &str) -> Result<TestOutcome> {
    let heading_re = Regex::new(r"<(h[1-6])\b[^>]*>")?;
    let tag_re = Regex::new(TAG_PATTERN)?;
    let lower = text.to_ascii_lowercase();

    for caps in heading_re.captures_iter(&lower) {
        let heading = &caps[1];
        let body_start = caps.get(0).map_or(0, |m| m.end());
        let close = format!("</{}>", heading);
        let Some(body_len) = lower[body_start..].find(&close) else {
            continue;
        };
        let body = &lower[body_start..body_start + body_len];

        // (opens, closes) per inner tag, in first-seen order
        let mut balance: Vec<(&str, usize, usize)> = Vec::new();
        for tag in tag_re.captures_iter(body) {
            let whole = tag.get(0).map_or("", |m| m.as_str());
            let name = tag.get(2).map_or("", |m| m.as_str());
            if name == heading
                || VOID_ELEMENTS.iter().any(|v| *v == name)
                || whole.ends_with("/>")
            {
                continue;
            }
            let is_close = !tag[1].is_empty();
            let entry = match balance.iter().position(|(n, _, _)| *n == name) {
                Some(idx) => &mut balance[idx],
                None => {
                    balance.push((name, 0, 0));
                    let last = balance.len() - 1;
                    &mut balance[last]
                }
            };
            if is_close {
                entry.2 += 1;
            } else {
                entry.1 += 1;
            }
        }

        if let Some((inner, _, _)) = balance.iter().find(|(_, opens, closes)| opens > closes) {
            return Ok(TestOutcome::fail(format!(
                "Found invalid nesting: <{}> closed before <{}>",
                heading, inner
            )));
        }
    }

    Ok(TestOutcome::Pass)
}

/// Fails when a non-nesting element is opened a second time before it was
/// closed, the usual result of typing `<cite>` where `</cite>` was meant.
pub fn check_reopened_tag(text: &str) -> Result<TestOutcome> {
    let tag_re = Regex::new(TAG_PATTERN)?;
    let lower = text.to_ascii_lowercase();
    let mut open: HashMap<&str, bool> = HashMap::new();

    for tag in tag_re.captures_iter(&lower) {
        let name = tag.get(2).map_or("", |m| m.as_str());
        if !NON_NESTING.iter().any(|n| *n == name) {
            continue;
        }
        let is_close = !tag[1].is_empty();
        let currently_open = open.entry(name).or_insert(false);
        if is_close {
            *currently_open = false;
        } else if *currently_open {
            return Ok(TestOutcome::fail(format!(
                "Found invalid closing tag: <{}> used instead of </{}>",
                name, name
            )));
        } else {
            *currently_open = true;
        }
    }

    Ok(TestOutcome::Pass)
}
