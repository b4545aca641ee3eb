//! Extraction regex synthesis from a context window.
//!
//! The context is split on the value; the text on each side becomes a
//! literal boundary. The left boundary starts at the last line break it
//! contains, the right one stops at the first. Boundary construction is an
//! `Option` step; when it yields nothing the value is replaced in the
//! escaped context instead.

use regex::Regex;

/// Placeholder for attributes that must match anything.
pub const IGNORE_SENTINEL: &str = "_CR_IGNORE_";

pub const LAZY_CAPTURE: &str = "(.+?)";

/// Used when nothing follows the value: a line end or the end of input.
const LINE_END: &str = r"(?:\r?\n|$)";

/// How much of the text after the value is kept as a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightBoundary {
    /// Only its first character (or up to the line break).
    FirstChar,
    /// All of it up to the line break.
    Whole,
}

/// `((?:[^D\\]|D)*?)` for delimiter `D`.
fn delimiter_capture(delimiter: char) -> String {
    let escaped = regex::escape(&delimiter.to_string());
    format!("((?:[^{escaped}\\\\]|{escaped})*?)")
}

fn escape_boundary(text: &str) -> String {
    regex::escape(text).replace(' ', r"\s")
}

fn first_char(text: &str) -> &str {
    text.char_indices()
        .nth(1)
        .map_or(text, |(index, _)| &text[..index])
}

/// Split `context` on `value`, dropping trailing empty pieces.
fn split_on_value<'c>(context: &'c str, value: &str) -> Vec<&'c str> {
    let mut parts: Vec<&str> = context.split(value).collect();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts
}

/// Boundary-based regex, or `None` when the context cannot be split around
/// the value or no candidate reads the value back out of the context.
///
/// A value that opens the context is anchored with `^`. When the one-char
/// right boundary also occurs inside the value, the whole rest of the line
/// is kept instead.
pub fn boundary_regex(value: &str, context: &str, mode: RightBoundary) -> Option<String> {
    if value.is_empty() || !context.contains(value) {
        return None;
    }

    let parts = split_on_value(context, value);
    let left_raw = parts.first().copied().unwrap_or_default();
    let right_raw = if parts.len() > 1 { parts.last().copied() } else { None };

    let modes: &[RightBoundary] = match mode {
        RightBoundary::FirstChar => &[RightBoundary::FirstChar, RightBoundary::Whole],
        RightBoundary::Whole => &[RightBoundary::Whole],
    };
    modes
        .iter()
        .map(|&mode| assemble(left_raw, right_raw, mode))
        .find(|pattern| reads_back(pattern, context, value))
}

fn assemble(left_raw: &str, right_raw: Option<&str>, mode: RightBoundary) -> String {
    let (left, begins_line) = match left_raw.rfind('\n') {
        Some(index) => (&left_raw[index + 1..], true),
        None => (left_raw, false),
    };

    let (right, ends_line) = match right_raw {
        Some(text) => match text.find('\n') {
            Some(index) => (Some(&text[..index]), true),
            None if mode == RightBoundary::Whole => (Some(text), false),
            None => (Some(first_char(text)), false),
        },
        None => (None, false),
    };

    let capture = match (left.chars().last(), right.and_then(|text| text.chars().next())) {
        (Some(before), Some(after)) if before == after => delimiter_capture(before),
        _ => LAZY_CAPTURE.to_string(),
    };

    let mut pattern = String::new();
    if begins_line {
        pattern.push_str(r"\n");
    } else if left.is_empty() {
        pattern.push('^');
    }
    pattern.push_str(&escape_boundary(left));
    pattern.push_str(&capture);
    match right {
        Some(text) => {
            pattern.push_str(&escape_boundary(text));
            if ends_line {
                pattern.push_str(r"\n");
            }
        }
        None => pattern.push_str(LINE_END),
    }
    pattern.replace(IGNORE_SENTINEL, LAZY_CAPTURE)
}

/// Whether the first group of `pattern` run over `context` is `value`.
fn reads_back(pattern: &str, context: &str, value: &str) -> bool {
    Regex::new(pattern)
        .ok()
        .and_then(|regex| regex.captures(context).and_then(|caps| caps.get(1)))
        .is_some_and(|group| group.as_str() == value)
}

/// Escaped context with every occurrence of the value made a lazy capture,
/// anchored at whichever end of the context the value touches.
pub fn fallback_regex(value: &str, context: &str) -> String {
    if value.is_empty() {
        return regex::escape(context);
    }
    let mut pattern = regex::escape(context).replace(&regex::escape(value), LAZY_CAPTURE);
    if context.starts_with(value) {
        pattern.insert(0, '^');
    }
    if context.ends_with(value) {
        pattern.push_str(LINE_END);
    }
    pattern
}

/// Regex whose first group captures `value` out of text shaped like
/// `context`.
pub fn generate_extractor_regex(value: &str, context: &str) -> String {
    boundary_regex(value, context, RightBoundary::FirstChar)
        .unwrap_or_else(|| fallback_regex(value, context))
}

/// Variant for a Set-Cookie line: the attributes after the value are kept so
/// the regex stays scoped to the cookie's Path/Domain.
pub fn generate_cookie_extractor_regex(value: &str, line: &str) -> String {
    boundary_regex(value, line, RightBoundary::Whole).unwrap_or_else(|| fallback_regex(value, line))
}
