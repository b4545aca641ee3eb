//! Correlation suggestions
//!
//! The engine's output: per dynamic parameter, where its value can be read
//! from (extraction candidates) and where it has to be written back
//! (replacement candidates). Callers materialize these into their own rule
//! format through [`CorrelationSuggestion::to_rules`].

use crate::core::appearance::{Appearance, SourceCategory};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Which part of a response an extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetField {
    ResponseHeaders,
    Body,
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetField::ResponseHeaders => write!(f, "RESPONSE_HEADERS"),
            TargetField::Body => write!(f, "BODY"),
        }
    }
}

/// Where inside a response a value was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LocationType {
    Header,
    Body,
    Cookie,
}

impl LocationType {
    pub fn target_field(&self) -> TargetField {
        match self {
            LocationType::Header | LocationType::Cookie => TargetField::ResponseHeaders,
            LocationType::Body => TargetField::Body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExtractorSpec {
    pub variable_name: String,
    pub regex: String,
    /// 1-based match index; `-1` extracts every match.
    pub match_number: i32,
    pub group_number: u32,
    pub target: TargetField,
    pub multivalued: bool,
}

impl ExtractorSpec {
    pub fn new(variable_name: impl Into<String>, regex: impl Into<String>, target: TargetField) -> Self {
        Self {
            variable_name: variable_name.into(),
            regex: regex.into(),
            match_number: 1,
            group_number: 1,
            target,
            multivalued: true,
        }
    }

    pub fn with_match_number(mut self, match_number: i32) -> Self {
        self.match_number = match_number;
        self
    }
}

impl fmt::Display for ExtractorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegexExtractor{{variable={}, regex={}, match={}, group={}, target={}, multivalued={}}}",
            self.variable_name,
            self.regex,
            self.match_number,
            self.group_number,
            self.target,
            self.multivalued
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReplacementSpec {
    pub variable_name: String,
    pub regex: String,
}

impl fmt::Display for ReplacementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegexReplacement{{variable={}, regex={}}}",
            self.variable_name, self.regex
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionCandidate {
    pub extractor: ExtractorSpec,
    /// Label of the response the value was located in.
    pub source_capture: String,
    pub value: String,
    pub name: String,
    pub source: SourceCategory,
    pub location: LocationType,
    /// The URL-encoded form was matched rather than the raw value.
    pub encoded: bool,
    pub context: String,
    pub json_path: Option<String>,
    /// Case-insensitive occurrences of the value in the searched text.
    pub occurrences: usize,
}

impl ExtractionCandidate {
    fn dedup_key(&self) -> (&str, &str, TargetField, &str) {
        (
            self.source_capture.as_str(),
            self.extractor.regex.as_str(),
            self.extractor.target,
            self.value.as_str(),
        )
    }
}

impl fmt::Display for ExtractionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} ({}) from {}: {}",
            self.name, self.value, self.source, self.source_capture, self.extractor
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementCandidate {
    pub replacement: ReplacementSpec,
    /// Label of the request the value is sent in.
    pub usage_capture: String,
    pub value: String,
    pub name: String,
    pub source: SourceCategory,
    pub sequence: usize,
}

impl fmt::Display for ReplacementCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} ({}) used on {}: {}",
            self.name, self.value, self.source, self.usage_capture, self.replacement
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    /// Derived from two traces of full traffic.
    Replay,
    /// Derived from the structure of a single trace.
    RulesAnalysis,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Replay => write!(f, "Replay"),
            Provenance::RulesAnalysis => write!(f, "Rules Analysis"),
        }
    }
}

/// A rule ready to be installed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorrelationRule {
    pub reference_name: String,
    pub extractor: Option<ExtractorSpec>,
    pub replacement: Option<ReplacementSpec>,
}

/// `(N) a, b, c`
pub fn aggregate(items: &[String]) -> String {
    format!("({}) {}", items.len(), items.join(", "))
}

/// Count of usages per distinct value.
pub fn value_counts(appearances: &[Appearance]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for appearance in appearances {
        *counts.entry(appearance.value.clone()).or_insert(0) += appearance.usages.len();
    }
    counts
}

/// `value (count), ...`
pub fn summarize_values(appearances: &[Appearance]) -> String {
    value_counts(appearances)
        .iter()
        .map(|(value, count)| format!("{value} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationSuggestion {
    param_name: String,
    original_value: String,
    new_value: String,
    provenance: Provenance,
    value_counts: BTreeMap<String, usize>,
    extractions: Vec<ExtractionCandidate>,
    replacements: Vec<ReplacementCandidate>,
    /// Labels of responses the value is obtained from.
    appearances: Vec<String>,
    /// Labels of requests the value is used on.
    usages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SuggestionBuilder {
    param_name: String,
    original_value: String,
    new_value: String,
    provenance: Provenance,
    value_counts: BTreeMap<String, usize>,
}

impl SuggestionBuilder {
    pub fn original_value(mut self, value: impl Into<String>) -> Self {
        self.original_value = value.into();
        self
    }

    pub fn new_value(mut self, value: impl Into<String>) -> Self {
        self.new_value = value.into();
        self
    }

    pub fn value_counts(mut self, counts: BTreeMap<String, usize>) -> Self {
        self.value_counts = counts;
        self
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn from_replay(self) -> Self {
        self.provenance(Provenance::Replay)
    }

    pub fn from_rules_analysis(self) -> Self {
        self.provenance(Provenance::RulesAnalysis)
    }

    pub fn build(self) -> CorrelationSuggestion {
        CorrelationSuggestion {
            param_name: self.param_name,
            original_value: self.original_value,
            new_value: self.new_value,
            provenance: self.provenance,
            value_counts: self.value_counts,
            extractions: Vec::new(),
            replacements: Vec::new(),
            appearances: Vec::new(),
            usages: Vec::new(),
        }
    }
}

impl CorrelationSuggestion {
    pub fn builder(param_name: impl Into<String>) -> SuggestionBuilder {
        SuggestionBuilder {
            param_name: param_name.into(),
            original_value: String::new(),
            new_value: String::new(),
            provenance: Provenance::Replay,
            value_counts: BTreeMap::new(),
        }
    }

    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    pub fn original_value(&self) -> &str {
        &self.original_value
    }

    pub fn new_value(&self) -> &str {
        &self.new_value
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn extractions(&self) -> &[ExtractionCandidate] {
        &self.extractions
    }

    pub fn replacements(&self) -> &[ReplacementCandidate] {
        &self.replacements
    }

    pub fn appearances(&self) -> &[String] {
        &self.appearances
    }

    pub fn usages(&self) -> &[String] {
        &self.usages
    }

    /// Variable name for the next extraction: `name#<count>`.
    pub fn extraction_param_name(&self) -> String {
        format!("{}#{}", self.param_name, self.extractions.len())
    }

    /// Returns false when an equivalent extraction is already present.
    pub fn add_extraction(&mut self, candidate: ExtractionCandidate) -> bool {
        if self
            .extractions
            .iter()
            .any(|existing| existing.dedup_key() == candidate.dedup_key())
        {
            return false;
        }
        self.add_appearance(&candidate.source_capture);
        self.extractions.push(candidate);
        true
    }

    /// Returns false when a replacement with the same string form exists.
    /// The form includes the usage capture, so the same spec applied to two
    /// requests is kept once per request.
    pub fn add_replacement(&mut self, candidate: ReplacementCandidate) -> bool {
        let rendered = candidate.to_string();
        if self
            .replacements
            .iter()
            .any(|existing| existing.to_string() == rendered)
        {
            return false;
        }
        self.add_usage(&candidate.usage_capture);
        self.replacements.push(candidate);
        true
    }

    pub fn add_appearance(&mut self, label: &str) {
        if !self.appearances.iter().any(|l| l == label) {
            self.appearances.push(label.to_string());
        }
    }

    pub fn add_usage(&mut self, label: &str) {
        if !self.usages.iter().any(|l| l == label) {
            self.usages.push(label.to_string());
        }
    }

    pub fn has_extractions(&self) -> bool {
        !self.extractions.is_empty()
    }

    pub fn has_replacements(&self) -> bool {
        !self.replacements.is_empty()
    }

    /// Both an extraction and a replacement were found.
    pub fn is_complete(&self) -> bool {
        self.has_extractions() && self.has_replacements()
    }

    pub fn obtained_from_string(&self) -> String {
        aggregate(&self.appearances)
    }

    pub fn used_on_string(&self) -> String {
        aggregate(&self.usages)
    }

    pub fn original_value_string(&self) -> String {
        match self.provenance {
            Provenance::Replay => self.original_value.clone(),
            Provenance::RulesAnalysis => self
                .value_counts
                .iter()
                .map(|(value, count)| format!("({count}) {value}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// One rule per extraction and per replacement, duplicates removed.
    pub fn to_rules(&self) -> Vec<CorrelationRule> {
        let candidates = self
            .extractions
            .iter()
            .map(|e| CorrelationRule {
                reference_name: e.extractor.variable_name.clone(),
                extractor: Some(e.extractor.clone()),
                replacement: None,
            })
            .chain(self.replacements.iter().map(|r| CorrelationRule {
                reference_name: r.replacement.variable_name.clone(),
                extractor: None,
                replacement: Some(r.replacement.clone()),
            }));

        let mut rules: Vec<CorrelationRule> = Vec::new();
        let mut duplicates = 0;
        for rule in candidates {
            if rules.contains(&rule) {
                duplicates += 1;
            } else {
                rules.push(rule);
            }
        }

        if duplicates > 0 {
            warn!(
                "Dropped {} duplicate rules for '{}'",
                duplicates, self.param_name
            );
        }
        if rules.is_empty() {
            warn!("Suggestion '{}' has nothing to convert into rules", self.param_name);
        }
        rules
    }
}

impl fmt::Display for CorrelationSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] original: {}, new: {}, obtained from: {}, used on: {}",
            self.param_name,
            self.provenance,
            self.original_value_string(),
            self.new_value,
            self.obtained_from_string(),
            self.used_on_string()
        )
    }
}
