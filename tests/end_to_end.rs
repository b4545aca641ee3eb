//! Full pipeline runs over in-memory traces.

mod common;

use autocorrelate::config::Configuration;
use autocorrelate::core::extraction::extract_trace;
use autocorrelate::core::pipeline::{analyze_recording, suggest_from_failing_replay, suggest_from_traces};
use autocorrelate::core::suggestion::{LocationType, Provenance, TargetField};
use common::*;
use proptest::prelude::*;
use regex::Regex;

#[test]
fn test_login_token_is_correlated_between_runs() {
    let recording = login_trace(RECORDED_TOKEN, 302);
    let replay = login_trace(REPLAYED_TOKEN, 302);

    let suggestions = suggest_from_traces(&recording, &replay, &Configuration::default());

    assert_eq!(suggestions.len(), 1);
    let suggestion = &suggestions[0];
    assert_eq!(suggestion.param_name(), "csrf");
    assert_eq!(suggestion.provenance(), Provenance::Replay);
    assert!(suggestion.is_complete());

    let extraction = &suggestion.extractions()[0];
    assert_eq!(extraction.source_capture, "001 GET /login");
    assert_eq!(extraction.location, LocationType::Header);
    assert_eq!(extraction.extractor.target, TargetField::ResponseHeaders);
    assert_eq!(extraction.extractor.regex, r"RF\-Token:\s(.+?)\n");

    let regex = Regex::new(&extraction.extractor.regex).unwrap();
    for (trace, token) in [(&recording, RECORDED_TOKEN), (&replay, REPLAYED_TOKEN)] {
        let headers = &trace.responses[0].headers;
        assert_eq!(&regex.captures(headers).unwrap()[1], token);
    }

    let replacement = &suggestion.replacements()[0];
    assert_eq!(replacement.usage_capture, "002 POST /login");
    assert_eq!(replacement.replacement.regex, "csrf=([^&]+)");
    assert_eq!(replacement.replacement.variable_name, extraction.extractor.variable_name);
}

#[test]
fn test_identical_runs_yield_nothing() {
    let recording = login_trace(RECORDED_TOKEN, 302);

    assert!(suggest_from_traces(&recording, &recording.clone(), &Configuration::default()).is_empty());
}

#[test]
fn test_failing_replay_points_at_stale_token() {
    let recording = login_trace(RECORDED_TOKEN, 302);
    let replay = login_trace(RECORDED_TOKEN, 403);

    let suggestions = suggest_from_failing_replay(&recording, &replay, &Configuration::default());

    let names: Vec<&str> = suggestions.iter().map(|s| s.param_name()).collect();
    assert_eq!(names, vec!["csrf"]);
}

#[test]
fn test_single_recording_analysis() {
    let suggestions = analyze_recording(&login_trace(RECORDED_TOKEN, 302), &Configuration::default());

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].provenance(), Provenance::RulesAnalysis);
    assert_eq!(suggestions[0].replacements()[0].usage_capture, "002 POST /login");
}

#[test]
fn test_rules_pair_extractor_with_replacement() {
    let suggestions = suggest_from_traces(
        &login_trace(RECORDED_TOKEN, 302),
        &login_trace(REPLAYED_TOKEN, 302),
        &Configuration::default(),
    );

    let rules = suggestions[0].to_rules();
    assert_eq!(rules.len(), 2);
    assert!(rules[0].extractor.is_some() && rules[0].replacement.is_none());
    assert!(rules[1].replacement.is_some());
    assert_eq!(rules[0].reference_name, rules[1].reference_name);
}

proptest! {
    #[test]
    fn prop_extraction_is_deterministic(token in "k[a-f0-9]{7}") {
        let trace = login_trace(&token, 302);
        let config = Configuration::default();

        prop_assert_eq!(extract_trace(&trace, &config), extract_trace(&trace, &config));
    }
}
