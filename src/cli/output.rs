//! Rendering suggestions for the terminal.

use crate::cli::args::OutputFormat;
use crate::core::suggestion::CorrelationSuggestion;
use anyhow::{Context, Result};
use std::fmt::Write;

/// Human-readable listing, one block per suggestion.
pub fn render_text(suggestions: &[CorrelationSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No correlation suggestions found.\n".to_string();
    }

    let mut out = String::new();
    for suggestion in suggestions {
        let _ = writeln!(out, "{} [{}]", suggestion.param_name(), suggestion.provenance());
        let _ = writeln!(out, "  original value: {}", suggestion.original_value_string());
        if !suggestion.new_value().is_empty() {
            let _ = writeln!(out, "  new value:      {}", suggestion.new_value());
        }
        let _ = writeln!(out, "  obtained from:  {}", suggestion.obtained_from_string());
        let _ = writeln!(out, "  used on:        {}", suggestion.used_on_string());
        for extraction in suggestion.extractions() {
            let _ = writeln!(
                out,
                "  extract {} from {} ({}): {}",
                extraction.extractor.variable_name,
                extraction.source_capture,
                extraction.extractor.target,
                extraction.extractor.regex
            );
            if let Some(path) = &extraction.json_path {
                let _ = writeln!(out, "    json path: {path}");
            }
            if extraction.occurrences > 1 {
                let _ = writeln!(out, "    value occurs {} times", extraction.occurrences);
            }
        }
        for replacement in suggestion.replacements() {
            let _ = writeln!(
                out,
                "  replace {} on {}: {}",
                replacement.replacement.variable_name, replacement.usage_capture, replacement.replacement.regex
            );
        }
        out.push('\n');
    }
    out
}

pub fn render_json(suggestions: &[CorrelationSuggestion]) -> Result<String> {
    serde_json::to_string_pretty(suggestions).context("Failed to serialize suggestions")
}

pub fn print_suggestions(suggestions: &[CorrelationSuggestion], format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(suggestions),
        OutputFormat::Json => render_json(suggestions)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
