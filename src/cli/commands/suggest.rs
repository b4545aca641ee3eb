//! `suggest` and `failing` command implementations

use super::{load_configuration, load_trace_file};
use crate::cli::args::SuggestionOptions;
use crate::cli::output::print_suggestions;
use crate::config::Configuration;
use crate::core::pipeline::{suggest_from_failing_replay_with_report, suggest_from_traces_with_report};
use crate::core::synthesis::TracingReport;
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Parameters of the `suggest` command.
#[derive(Debug, Clone)]
pub struct SuggestParams {
    pub recording: PathBuf,
    pub replay: PathBuf,
    pub accept_orphans: bool,
    pub accept_replay_orphans: bool,
    pub accept_equal: bool,
    pub requested: Vec<String>,
    pub options: SuggestionOptions,
}

/// Command-line flags layered over the loaded configuration. A flag can
/// only switch a policy on.
fn merge_policy(config: Configuration, params: &SuggestParams) -> Configuration {
    let mut config = Configuration {
        accept_original_orphans: config.accept_original_orphans || params.accept_orphans,
        accept_replay_orphans: config.accept_replay_orphans || params.accept_replay_orphans,
        accept_equal_appearances: config.accept_equal_appearances || params.accept_equal,
        ..config
    };
    config.add_requested_parameters(params.requested.iter().cloned());
    config
}

pub async fn run_suggest_command(params: SuggestParams) -> Result<()> {
    let loaded = load_configuration(params.options.config.as_deref()).await?;
    let config = merge_policy(loaded, &params);

    let recording = load_trace_file(&params.recording).await?;
    let replay = load_trace_file(&params.replay).await?;

    let suggestions = suggest_from_traces_with_report(&recording, &replay, &config, &mut TracingReport);
    info!("{} suggestions", suggestions.len());
    print_suggestions(&suggestions, params.options.format)
}

pub async fn run_failing_command(recording: PathBuf, replay: PathBuf, options: SuggestionOptions) -> Result<()> {
    let config = load_configuration(options.config.as_deref()).await?;
    let recording = load_trace_file(&recording).await?;
    let replay = load_trace_file(&replay).await?;

    let suggestions = suggest_from_failing_replay_with_report(&recording, &replay, &config, &mut TracingReport);
    info!("{} suggestions for failing captures", suggestions.len());
    print_suggestions(&suggestions, options.format)
}
