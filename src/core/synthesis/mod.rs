//! Suggestion synthesis
//!
//! Turns a [`DynamicCandidate`] into a [`CorrelationSuggestion`]: every
//! appearance value is looked up in every response; each hit yields an
//! extraction regex built from the value's context, and every request that
//! sends an extracted value yields a replacement regex.
//!
//! The synthesizer owns no global state. Events go to the
//! [`SynthesisReport`] it is given, and body structure lookups are memoized
//! in a [`StructureCache`] owned by the synthesizer instance.

pub mod context;
pub mod cookie;
pub mod extractor_regex;
pub mod locate;
pub mod replacement;
pub mod report;


use crate::capture::Response;
use crate::config::Configuration;
use crate::core::appearance::{Appearance, SourceCategory};
use crate::core::diff::DynamicCandidate;
use crate::core::json_path::json_path_to_value;
use crate::core::suggestion::{
    summarize_values, value_counts, CorrelationSuggestion, ExtractionCandidate, ExtractorSpec, LocationType,
    Provenance, ReplacementCandidate, ReplacementSpec, TargetField,
};
use std::collections::HashMap;
use tracing::{debug, warn};

pub use context::{context_window, context_window_at, count_occurrences, occurrence_offsets};
pub use cookie::set_cookie_context;
pub use extractor_regex::{generate_cookie_extractor_regex, generate_extractor_regex, IGNORE_SENTINEL};
pub use locate::{locate, Location, ResponseView};
pub use replacement::replacement_regex;
pub use report::{
    CollectingReport, NullReport, ReportEvent, StructureCache, StructureType, SynthesisReport, TracingReport,
};

/// What one located value contributes to an extraction.
struct ExtractionContext {
    context: String,
    regex: String,
    json_path: Option<String>,
}

pub struct Synthesizer<'a> {
    config: &'a Configuration,
    report: &'a mut dyn SynthesisReport,
    structures: StructureCache,
    provenance: Provenance,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a Configuration, report: &'a mut dyn SynthesisReport) -> Self {
        Self {
            config,
            report,
            structures: StructureCache::new(),
            provenance: Provenance::Replay,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Extractions from `responses` and replacements for every request that
    /// sends an extracted value.
    pub fn synthesize(&mut self, candidate: &DynamicCandidate, responses: &[Response]) -> CorrelationSuggestion {
        let mut suggestion = CorrelationSuggestion::builder(&candidate.name)
            .original_value(summarize_values(&candidate.original_appearances))
            .new_value(summarize_values(&candidate.other_appearances))
            .value_counts(value_counts(&candidate.original_appearances))
            .provenance(self.provenance)
            .build();

        // value -> variable of the first extraction that yielded it
        let mut reference_names: HashMap<String, String> = HashMap::new();
        let limit = self.config.appearance_limit();

        'responses: for response in responses {
            let view = ResponseView::new(response);
            for appearance in candidate.all_appearances() {
                if let Some(limit) = limit {
                    if suggestion.extractions().len() >= limit {
                        warn!(
                            "Stopped synthesis of '{}' after {} extractions",
                            candidate.name, limit
                        );
                        self.report.record(ReportEvent::AppearanceCapReached {
                            name: candidate.name.clone(),
                            limit,
                        });
                        break 'responses;
                    }
                }
                self.extract_from(&view, &candidate.name, appearance, &mut suggestion, &mut reference_names);
            }
        }

        self.add_replacements(candidate, &reference_names, &mut suggestion);

        debug!(
            "Synthesized '{}': {} extractions, {} replacements",
            candidate.name,
            suggestion.extractions().len(),
            suggestion.replacements().len()
        );
        suggestion
    }

    fn extract_from(
        &mut self,
        view: &ResponseView<'_>,
        name: &str,
        appearance: &Appearance,
        suggestion: &mut CorrelationSuggestion,
        reference_names: &mut HashMap<String, String>,
    ) {
        let Some(location) = locate(view, &appearance.value) else {
            self.report.record(ReportEvent::ValueNotFound {
                name: name.to_string(),
                capture: view.label.to_string(),
            });
            return;
        };
        self.report.record(ReportEvent::ValueLocated {
            name: name.to_string(),
            capture: view.label.to_string(),
            location: location.kind,
            encoded: location.encoded,
        });

        let Some(extraction) = self.contextualize(view, name, appearance, &location) else {
            debug!("No context for '{}' in {}", name, view.label);
            self.report.record(ReportEvent::ContextUnavailable {
                name: name.to_string(),
                capture: view.label.to_string(),
            });
            return;
        };

        let variable = suggestion.extraction_param_name();
        let candidate = ExtractionCandidate {
            extractor: ExtractorSpec::new(&variable, extraction.regex, location.kind.target_field()),
            source_capture: view.label.to_string(),
            value: appearance.value.clone(),
            name: name.to_string(),
            source: appearance.source,
            location: location.kind,
            encoded: location.encoded,
            context: extraction.context,
            json_path: extraction.json_path,
            occurrences: count_occurrences(view.text(location.kind), &location.value),
        };

        if suggestion.add_extraction(candidate) {
            reference_names
                .entry(appearance.value.clone())
                .or_insert(variable);
        } else {
            debug!("Duplicate extraction of '{}' from {}", name, view.label);
            self.report.record(ReportEvent::DuplicateDropped {
                name: name.to_string(),
                capture: view.label.to_string(),
            });
        }
    }

    fn contextualize(
        &mut self,
        view: &ResponseView<'_>,
        name: &str,
        appearance: &Appearance,
        location: &Location,
    ) -> Option<ExtractionContext> {
        let text = view.text(location.kind);
        let context_length = self.config.context_length;

        match location.kind {
            LocationType::Cookie => {
                let from_cookie = appearance.source == SourceCategory::Cookie;
                match set_cookie_context(view.headers, name, &location.value, from_cookie) {
                    Some(line) => Some(ExtractionContext {
                        regex: generate_cookie_extractor_regex(&location.value, &line),
                        context: line,
                        json_path: None,
                    }),
                    None if from_cookie => None,
                    None => plain_context(text, &location.value, context_length),
                }
            }
            LocationType::Header => plain_context(text, &location.value, context_length),
            LocationType::Body => {
                let structure = self.structures.structure_of(view.label, LocationType::Body, text);
                let mut extraction = plain_context(text, &location.value, context_length)?;
                if structure == StructureType::Json {
                    let path = json_path_to_value(text, &location.value, true);
                    if !path.is_empty() {
                        extraction.json_path = Some(path);
                    }
                }
                Some(extraction)
            }
        }
    }

    fn add_replacements(
        &mut self,
        candidate: &DynamicCandidate,
        reference_names: &HashMap<String, String>,
        suggestion: &mut CorrelationSuggestion,
    ) {
        let mut sequence = 0;
        for appearance in candidate.all_appearances() {
            let Some(variable) = reference_names.get(&appearance.value) else {
                continue;
            };

            for usage in &appearance.usages {
                let Some(regex) = replacement_regex(&appearance.name, appearance.source) else {
                    self.report.record(ReportEvent::ReplacementSkipped {
                        name: candidate.name.clone(),
                        usage: usage.label.clone(),
                        source: appearance.source,
                    });
                    continue;
                };

                let replacement = ReplacementCandidate {
                    replacement: ReplacementSpec {
                        variable_name: variable.clone(),
                        regex,
                    },
                    usage_capture: usage.label.clone(),
                    value: appearance.value.clone(),
                    name: appearance.name.clone(),
                    source: appearance.source,
                    sequence,
                };
                if suggestion.add_replacement(replacement) {
                    sequence += 1;
                }
            }
        }
    }
}

fn plain_context(text: &str, value: &str, context_length: usize) -> Option<ExtractionContext> {
    let context = context_window(text, value, context_length)?;
    Some(ExtractionContext {
        regex: generate_extractor_regex(value, &context),
        context,
        json_path: None,
    })
}

/// Synthesis without a report sink.
pub fn synthesize(candidate: &DynamicCandidate, responses: &[Response], config: &Configuration) -> CorrelationSuggestion {
    let mut report = NullReport;
    Synthesizer::new(config, &mut report).synthesize(candidate, responses)
}

/// One extractor per occurrence of `value` in `text`, each reading every
/// match (`match_number = -1`).
pub fn multi_valued_extractors(
    text: &str,
    value: &str,
    name: &str,
    target: TargetField,
    config: &Configuration,
) -> Vec<ExtractorSpec> {
    occurrence_offsets(text, value)
        .into_iter()
        .filter_map(|offset| context_window_at(text, value, offset, config.context_length))
        .enumerate()
        .map(|(index, context)| {
            ExtractorSpec::new(
                format!("{name}#{index}"),
                generate_extractor_regex(value, &context),
                target,
            )
            .with_match_number(-1)
        })
        .collect()
}
