//! Set-Cookie context matching.
//!
//! A cookie value is only correlated with the `Set-Cookie` line whose
//! `Path`/`Domain` scope equals the one recorded in the parameter name. The
//! matched line is re-emitted with every other attribute replaced by
//! [`IGNORE_SENTINEL`] so the synthesized regex tolerates `Expires`,
//! `Max-Age` and friends changing between runs.

use super::extractor_regex::IGNORE_SENTINEL;
use crate::core::extraction::headers::{cookie_scope, split_scoped_cookie_name};
use tracing::trace;

fn is_set_cookie_line(line: &str) -> bool {
    line.trim_start()
        .split_once(':')
        .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("Set-Cookie"))
}

/// `Set-Cookie` lines of a raw header block.
pub fn set_cookie_lines(headers: &str) -> Vec<&str> {
    headers.lines().filter(|line| is_set_cookie_line(line)).collect()
}

fn is_scope_attribute(attribute: &str) -> bool {
    attribute
        .split_once('=')
        .map(|(key, _)| key.trim())
        .is_some_and(|key| key.eq_ignore_ascii_case("path") || key.eq_ignore_ascii_case("domain"))
}

/// Matched line with volatile attributes masked, or `None` when no line
/// carries `value` under the expected name and scope.
///
/// `name` may carry a scope suffix (`sid[Path=/a]`, `sid[Path=/a]_encoded`).
/// When `source_is_cookie` is false the value came from somewhere else and
/// any line carrying it is accepted.
pub fn set_cookie_context(headers: &str, name: &str, value: &str, source_is_cookie: bool) -> Option<String> {
    let (base_name, expected_scope) = split_scoped_cookie_name(name);

    for line in set_cookie_lines(headers) {
        let Some((_, rest)) = line.split_once(':') else {
            continue;
        };
        let cookie = rest.trim_start();
        let prefix = &line[..line.len() - cookie.len()];

        let mut segments = cookie.split(';');
        let Some(first) = segments.next() else {
            continue;
        };
        let Some((cookie_name, cookie_value)) = first.split_once('=') else {
            continue;
        };
        if cookie_value.trim() != value {
            continue;
        }

        let attributes: Vec<&str> = segments.collect();
        if source_is_cookie {
            if cookie_name.trim() != base_name {
                continue;
            }
            let scope = cookie_scope(attributes.iter().copied());
            if scope != expected_scope {
                trace!("Skipping {} on scope mismatch: {:?}", line.trim(), scope);
                continue;
            }
        }

        let mut context = format!("{prefix}{first}");
        for attribute in attributes {
            context.push(';');
            if is_scope_attribute(attribute) {
                context.push_str(attribute);
            } else {
                context.push_str(IGNORE_SENTINEL);
            }
        }
        return Some(context);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: &str = "HTTP/1.1 200 OK\n\
        Set-Cookie: sid=s-100; Path=/a; HttpOnly\n\
        set-cookie: sid=s-100; Path=/b; Max-Age=60\n\
        Set-Cookie: lang=en-GB\n\
        Server: nginx";

    #[test]
    fn test_selects_line_with_matching_scope() {
        assert_eq!(
            set_cookie_context(HEADERS, "sid[Path=/b]", "s-100", true).as_deref(),
            Some("set-cookie: sid=s-100; Path=/b;_CR_IGNORE_")
        );
        assert_eq!(
            set_cookie_context(HEADERS, "sid[Path=/a]_encoded", "s-100", true).as_deref(),
            Some("Set-Cookie: sid=s-100; Path=/a;_CR_IGNORE_")
        );
    }

    #[test]
    fn test_scope_mismatch_is_rejected() {
        assert!(set_cookie_context(HEADERS, "sid[Path=/c]", "s-100", true).is_none());
        assert!(set_cookie_context(HEADERS, "sid", "s-100", true).is_none());
    }

    #[test]
    fn test_unscoped_cookie_matches_unscoped_line() {
        assert_eq!(
            set_cookie_context(HEADERS, "lang", "en-GB", true).as_deref(),
            Some("Set-Cookie: lang=en-GB")
        );
    }

    #[test]
    fn test_other_sources_match_any_line_with_value() {
        assert_eq!(
            set_cookie_context(HEADERS, "session", "s-100", false).as_deref(),
            Some("Set-Cookie: sid=s-100; Path=/a;_CR_IGNORE_")
        );
        assert!(set_cookie_context(HEADERS, "session", "zz-1", false).is_none());
    }

    #[test]
    fn test_lines_are_found_case_insensitively() {
        assert_eq!(set_cookie_lines(HEADERS).len(), 3);
    }
}
