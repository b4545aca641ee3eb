//! Collaborators handed to the synthesizer: an event sink and a body
//! structure cache.

use crate::capture::is_json_document;
use crate::core::appearance::SourceCategory;
use crate::core::suggestion::LocationType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Something the synthesizer noticed while working on one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    ValueLocated {
        name: String,
        capture: String,
        location: LocationType,
        encoded: bool,
    },
    ValueNotFound {
        name: String,
        capture: String,
    },
    ContextUnavailable {
        name: String,
        capture: String,
    },
    AppearanceCapReached {
        name: String,
        limit: usize,
    },
    ReplacementSkipped {
        name: String,
        usage: String,
        source: SourceCategory,
    },
    DuplicateDropped {
        name: String,
        capture: String,
    },
    /// A suggestion missing either its extraction or its replacement.
    OrphanSuggestion {
        name: String,
    },
}

impl fmt::Display for ReportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportEvent::ValueLocated {
                name,
                capture,
                location,
                encoded,
            } => {
                let form = if *encoded { "encoded" } else { "raw" };
                write!(f, "{name}: {form} value located in {location:?} of '{capture}'")
            }
            ReportEvent::ValueNotFound { name, capture } => {
                write!(f, "{name}: value not found in '{capture}'")
            }
            ReportEvent::ContextUnavailable { name, capture } => {
                write!(f, "{name}: no usable context in '{capture}'")
            }
            ReportEvent::AppearanceCapReached { name, limit } => {
                write!(f, "{name}: stopped after {limit} extractions")
            }
            ReportEvent::ReplacementSkipped {
                name,
                usage,
                source,
            } => write!(f, "{name}: no replacement for {source} on '{usage}'"),
            ReportEvent::DuplicateDropped { name, capture } => {
                write!(f, "{name}: duplicate extraction from '{capture}' dropped")
            }
            ReportEvent::OrphanSuggestion { name } => write!(f, "{name}: incomplete suggestion"),
        }
    }
}

pub trait SynthesisReport {
    fn record(&mut self, event: ReportEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReport;

impl SynthesisReport for NullReport {
    fn record(&mut self, _event: ReportEvent) {}
}

/// Keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingReport {
    pub events: Vec<ReportEvent>,
}

impl CollectingReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ReportEvent) -> bool,
    {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}

impl SynthesisReport for CollectingReport {
    fn record(&mut self, event: ReportEvent) {
        self.events.push(event);
    }
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReport;

impl SynthesisReport for TracingReport {
    fn record(&mut self, event: ReportEvent) {
        debug!("{}", event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    Json,
    Raw,
}

/// Memoized structure of a capture's text, keyed by capture and location.
#[derive(Debug, Default, Clone)]
pub struct StructureCache {
    entries: HashMap<(String, LocationType), StructureType>,
}

impl StructureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_of(&mut self, capture: &str, location: LocationType, text: &str) -> StructureType {
        *self
            .entries
            .entry((capture.to_string(), location))
            .or_insert_with(|| {
                if is_json_document(text) {
                    StructureType::Json
                } else {
                    StructureType::Raw
                }
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
