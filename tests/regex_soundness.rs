//! Synthesized extractors must read back the value they were built from,
//! and the value a later run puts in the same place.

mod common;

use autocorrelate::capture::Response;
use autocorrelate::config::Configuration;
use autocorrelate::core::appearance::{Appearance, SourceCategory, UsageRef};
use autocorrelate::core::diff::DynamicCandidate;
use autocorrelate::core::pipeline::suggest_from_traces;
use autocorrelate::core::synthesis::synthesize;
use common::login_trace;
use proptest::prelude::*;
use regex::Regex;

fn first_group(pattern: &str, text: &str) -> Option<String> {
    Regex::new(pattern)
        .ok()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn argument_candidate(value: &str) -> DynamicCandidate {
    let appearance = Appearance::new(
        "token",
        value,
        SourceCategory::Arguments,
        UsageRef::new("002 POST /submit", "POST", "/submit"),
        "recording",
    );
    DynamicCandidate::new("token", vec![appearance], Vec::new())
}

#[test]
fn test_regex_metacharacters_in_context_are_escaped() {
    let body = "<a href=\"/s?q=v-1.5&lang=en\">(search)</a>";
    let response = Response::new("001 GET /search").with_body(body);

    let suggestion = synthesize(&argument_candidate("v-1.5"), &[response], &Configuration::default());

    let extraction = &suggestion.extractions()[0];
    assert!(Regex::new(&extraction.extractor.regex).is_ok());
    assert_eq!(first_group(&extraction.extractor.regex, body).as_deref(), Some("v-1.5"));
}

#[test]
fn test_value_at_end_of_body_is_anchored() {
    let body = "session=tk-9911";
    let response = Response::new("001 GET /start").with_body(body);

    let suggestion = synthesize(&argument_candidate("tk-9911"), &[response], &Configuration::default());

    let regex = &suggestion.extractions()[0].extractor.regex;
    assert_eq!(first_group(regex, body).as_deref(), Some("tk-9911"));
    assert_eq!(first_group(regex, "session=tk-0000").as_deref(), Some("tk-0000"));
}

#[test]
fn test_body_that_is_only_the_value() {
    let response = Response::new("001 GET /token").with_body("459581b0");

    let suggestion = synthesize(&argument_candidate("459581b0"), &[response], &Configuration::default());

    let regex = &suggestion.extractions()[0].extractor.regex;
    assert_eq!(first_group(regex, "459581b0").as_deref(), Some("459581b0"));
    assert_eq!(first_group(regex, "a1b2c3d4").as_deref(), Some("a1b2c3d4"));
}

#[test]
fn test_value_containing_its_right_delimiter() {
    let response = Response::new("001 GET /list").with_body("a;b;c");

    let suggestion = synthesize(&argument_candidate("a;b"), &[response], &Configuration::default());

    let regex = &suggestion.extractions()[0].extractor.regex;
    assert_eq!(first_group(regex, "a;b;c").as_deref(), Some("a;b"));
}

proptest! {
    #[test]
    fn prop_header_extractor_reads_both_runs(
        recorded in "k[a-f0-9]{7}",
        replayed in "k[a-f0-9]{7}",
    ) {
        prop_assume!(recorded != replayed);
        let recording = login_trace(&recorded, 302);
        let replay = login_trace(&replayed, 302);

        let suggestions = suggest_from_traces(&recording, &replay, &Configuration::default());

        prop_assert_eq!(suggestions.len(), 1);
        let regex = &suggestions[0].extractions()[0].extractor.regex;
        prop_assert_eq!(first_group(regex, &recording.responses[0].headers), Some(recorded));
        prop_assert_eq!(first_group(regex, &replay.responses[0].headers), Some(replayed));
    }

    #[test]
    fn prop_body_extractor_recovers_value(
        prefix in "[a-z<>=\" ]{0,10}",
        value in "v[a-z0-9]{5,10}",
        suffix in "([a-z0-9]?[;&\"<>/ ][a-z ]{0,14})?",
    ) {
        let body = format!("{prefix}{value}{suffix}");
        prop_assume!(body.matches(value.as_str()).count() == 1);
        let response = Response::new("001 GET /page").with_body(body.clone());

        let suggestion = synthesize(&argument_candidate(&value), &[response], &Configuration::default());

        prop_assert_eq!(suggestion.extractions().len(), 1);
        let regex = &suggestion.extractions()[0].extractor.regex;
        prop_assert_eq!(first_group(regex, &body), Some(value));
    }
}
