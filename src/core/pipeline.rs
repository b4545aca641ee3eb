//! End-to-end correlation pipelines
//!
//! Each pipeline composes extraction, diff and synthesis over in-memory
//! traces. They perform no I/O; loading traces is the caller's job.

use crate::capture::Trace;
use crate::config::Configuration;
use crate::core::diff::{diff, DynamicCandidate};
use crate::core::extraction::{AppearanceExtractor, RECORDING_ORIGIN, REPLAY_ORIGIN};
use crate::core::suggestion::{CorrelationSuggestion, Provenance};
use crate::core::synthesis::{NullReport, ReportEvent, SynthesisReport, Synthesizer};
use std::collections::HashSet;
use tracing::{debug, info};

/// Splits suggestions into complete ones and orphans (missing either the
/// extraction or the replacement side).
pub fn partition_orphans(suggestions: Vec<CorrelationSuggestion>) -> (Vec<CorrelationSuggestion>, Vec<CorrelationSuggestion>) {
    suggestions
        .into_iter()
        .partition(CorrelationSuggestion::is_complete)
}

/// Recording requests against full replay traffic.
pub fn suggest_from_traces(recording: &Trace, replay: &Trace, config: &Configuration) -> Vec<CorrelationSuggestion> {
    suggest_from_traces_with_report(recording, replay, config, &mut NullReport)
}

pub fn suggest_from_traces_with_report(
    recording: &Trace,
    replay: &Trace,
    config: &Configuration,
    report: &mut dyn SynthesisReport,
) -> Vec<CorrelationSuggestion> {
    let original = AppearanceExtractor::new(config, RECORDING_ORIGIN).extract_requests(&recording.requests);
    let other = AppearanceExtractor::new(config, REPLAY_ORIGIN).extract_trace(replay);
    debug!(
        "Extracted {} recording and {} replay parameters",
        original.len(),
        other.len()
    );

    let candidates = diff(&original, &other, config);
    info!("Found {} dynamic candidates", candidates.len());

    let mut synthesizer = Synthesizer::new(config, report);
    candidates
        .iter()
        .map(|candidate| synthesizer.synthesize(candidate, &recording.responses))
        .collect()
}

/// Suggestions for the captures that fail in `replay` but not in
/// `recording`. Parameters those captures send unchanged are kept, since a
/// stale value is the usual cause of the failure.
pub fn suggest_from_failing_replay(
    recording: &Trace,
    replay: &Trace,
    config: &Configuration,
) -> Vec<CorrelationSuggestion> {
    suggest_from_failing_replay_with_report(recording, replay, config, &mut NullReport)
}

pub fn suggest_from_failing_replay_with_report(
    recording: &Trace,
    replay: &Trace,
    config: &Configuration,
    report: &mut dyn SynthesisReport,
) -> Vec<CorrelationSuggestion> {
    let already_failing: HashSet<&str> = recording.failing_labels().into_iter().collect();
    let newly_failing: HashSet<&str> = replay
        .failing_labels()
        .into_iter()
        .filter(|label| !already_failing.contains(label))
        .collect();
    if newly_failing.is_empty() {
        info!("Replay has no captures failing only on replay");
        return Vec::new();
    }
    debug!("Captures failing on replay: {:?}", newly_failing);

    let failing = replay.retain_labels(|label| newly_failing.contains(label));
    let config = config.clone().with_accept_equal_appearances(true);

    let original = AppearanceExtractor::new(&config, RECORDING_ORIGIN).extract_trace(recording);
    let other = AppearanceExtractor::new(&config, REPLAY_ORIGIN).extract_trace(&failing);
    let candidates = diff(&original, &other, &config);
    info!("Found {} candidates in failing captures", candidates.len());

    let suggestions: Vec<CorrelationSuggestion> = {
        let mut synthesizer = Synthesizer::new(&config, &mut *report);
        candidates
            .iter()
            .map(|candidate| synthesizer.synthesize(candidate, &recording.responses))
            .collect()
    };

    let (complete, orphans) = partition_orphans(suggestions);
    for orphan in &orphans {
        info!("Orphan suggestion: {}", orphan);
        report.record(ReportEvent::OrphanSuggestion {
            name: orphan.param_name().to_string(),
        });
    }
    complete
}

/// Single-trace analysis: request parameters whose values can be read from
/// an earlier response of the same recording.
pub fn analyze_recording(recording: &Trace, config: &Configuration) -> Vec<CorrelationSuggestion> {
    analyze_recording_with_report(recording, config, &mut NullReport)
}

pub fn analyze_recording_with_report(
    recording: &Trace,
    config: &Configuration,
    report: &mut dyn SynthesisReport,
) -> Vec<CorrelationSuggestion> {
    let parameters = AppearanceExtractor::new(config, RECORDING_ORIGIN).extract_requests(&recording.requests);
    let mut synthesizer = Synthesizer::new(config, report).with_provenance(Provenance::RulesAnalysis);

    parameters
        .iter()
        .filter(|(_, appearances)| !config.exceeds_appearance_limit(appearances.len()))
        .map(|(name, appearances)| DynamicCandidate::new(name, appearances.to_vec(), Vec::new()))
        .map(|candidate| synthesizer.synthesize(&candidate, &recording.responses))
        .filter(CorrelationSuggestion::is_complete)
        .collect()
}
