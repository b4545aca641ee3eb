//! `analyze` command implementation

use super::{load_configuration, load_trace_file};
use crate::cli::args::SuggestionOptions;
use crate::cli::output::print_suggestions;
use crate::core::pipeline::analyze_recording_with_report;
use crate::core::synthesis::TracingReport;
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

pub async fn run_analyze_command(recording: PathBuf, options: SuggestionOptions) -> Result<()> {
    let config = load_configuration(options.config.as_deref()).await?;
    let recording = load_trace_file(&recording).await?;

    let suggestions = analyze_recording_with_report(&recording, &config, &mut TracingReport);
    info!("{} parameters can be read from earlier responses", suggestions.len());
    print_suggestions(&suggestions, options.format)
}
