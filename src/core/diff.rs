//! Cross-trace diff
//!
//! Compares the parameter traces of two runs of the same workflow and keeps
//! the parameters whose values look dynamic. Which orphans and
//! apparently-equal parameters survive is decided by the acceptance flags of
//! [`Configuration`].

use crate::config::Configuration;
use crate::core::appearance::{Appearance, ParameterTrace};
use crate::core::extraction::is_parameterized;
use serde::Serialize;
use tracing::{debug, trace, warn};

/// A parameter suspected of needing correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicCandidate {
    pub name: String,
    pub original_appearances: Vec<Appearance>,
    /// Empty for orphans and accepted apparently-equal parameters.
    pub other_appearances: Vec<Appearance>,
    /// One side already carries `${name#N}` references and the other does not.
    pub flagged_parameterization: bool,
}

impl DynamicCandidate {
    pub fn new(name: impl Into<String>, original: Vec<Appearance>, other: Vec<Appearance>) -> Self {
        Self {
            name: name.into(),
            original_appearances: original,
            other_appearances: other,
            flagged_parameterization: false,
        }
    }

    fn flagged(mut self, flagged: bool) -> Self {
        self.flagged_parameterization = flagged;
        self
    }

    /// Original appearances first, then the other side's.
    pub fn all_appearances(&self) -> impl Iterator<Item = &Appearance> {
        self.original_appearances
            .iter()
            .chain(self.other_appearances.iter())
    }

    pub fn is_orphan(&self) -> bool {
        self.original_appearances.is_empty() || self.other_appearances.is_empty()
    }
}

/// Sorted `source:value` keys joined by newlines.
fn canonical_form(appearances: &[Appearance]) -> String {
    let mut keys: Vec<String> = appearances.iter().map(Appearance::comparison_key).collect();
    keys.sort();
    keys.join("\n")
}

fn parameterization_differs(original: &[Appearance], other: &[Appearance]) -> bool {
    let parameterized = |appearances: &[Appearance]| appearances.iter().any(|a| is_parameterized(&a.value));
    parameterized(original) != parameterized(other)
}

/// Parameters of `original` whose values differ in `other`, plus the
/// orphans and equal parameters the configuration accepts.
pub fn diff(original: &ParameterTrace, other: &ParameterTrace, config: &Configuration) -> Vec<DynamicCandidate> {
    let mut candidates = Vec::new();

    for (name, appearances) in original.iter() {
        if config.is_requested(name) {
            debug!("Including requested parameter '{}'", name);
            candidates.push(DynamicCandidate::new(name, appearances.to_vec(), Vec::new()));
            continue;
        }

        let Some(others) = other.get(name) else {
            if config.accept_original_orphans {
                debug!("Accepting orphan '{}'", name);
                candidates.push(DynamicCandidate::new(name, appearances.to_vec(), Vec::new()));
            } else {
                trace!("Skipping orphan '{}'", name);
            }
            continue;
        };

        if config.exceeds_appearance_limit(appearances.len()) || config.exceeds_appearance_limit(others.len()) {
            debug!(
                "Skipping '{}': {} / {} appearances exceed the limit of {}",
                name,
                appearances.len(),
                others.len(),
                config.max_number_of_appearances
            );
            continue;
        }

        let flagged = parameterization_differs(appearances, others);
        if flagged {
            warn!("Parameter '{}' is parameterized in only one of the traces", name);
        }

        if canonical_form(appearances) == canonical_form(others) {
            if config.accept_equal_appearances {
                debug!("Accepting apparently equal '{}'", name);
                candidates.push(DynamicCandidate::new(name, appearances.to_vec(), Vec::new()).flagged(flagged));
            } else {
                trace!("Skipping apparently equal '{}'", name);
            }
            continue;
        }

        candidates.push(DynamicCandidate::new(name, appearances.to_vec(), others.to_vec()).flagged(flagged));
    }

    for (name, others) in other.iter() {
        if original.contains(name) {
            continue;
        }
        if config.accept_replay_orphans || config.is_requested(name) {
            debug!("Accepting replay orphan '{}'", name);
            candidates.push(DynamicCandidate::new(name, Vec::new(), others.to_vec()));
        }
    }

    debug!("Diff produced {} candidates", candidates.len());
    candidates
}

/// Candidates for a replay that only holds failed captures: every parameter
/// of `replay` also known to `recording`, with the recording's appearances on
/// both sides.
pub fn diff_failed_replay(recording: &ParameterTrace, replay: &ParameterTrace) -> Vec<DynamicCandidate> {
    replay
        .names()
        .filter_map(|name| {
            recording.get(name).map(|appearances| {
                DynamicCandidate::new(name, appearances.to_vec(), appearances.to_vec())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::appearance::{SourceCategory, UsageRef};

    fn appearance(name: &str, value: &str, source: SourceCategory, label: &str) -> Appearance {
        Appearance::new(name, value, source, UsageRef::new(label, "GET", "/"), "test")
    }

    fn trace_of(appearances: Vec<Appearance>) -> ParameterTrace {
        appearances.into_iter().collect()
    }

    fn names(candidates: &[DynamicCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_changed_value_is_a_candidate() {
        let original = trace_of(vec![appearance("csrf", "459581b0", SourceCategory::Arguments, "login")]);
        let other = trace_of(vec![appearance("csrf", "a1b2c3d4", SourceCategory::Arguments, "login")]);

        let candidates = diff(&original, &other, &Configuration::default());

        assert_eq!(names(&candidates), vec!["csrf"]);
        assert_eq!(candidates[0].other_appearances[0].value, "a1b2c3d4");
        assert!(!candidates[0].is_orphan());
    }

    #[test]
    fn test_orphans_follow_acceptance_flags() {
        let original = trace_of(vec![appearance("a", "v1", SourceCategory::Arguments, "x")]);
        let other = trace_of(vec![appearance("b", "v2", SourceCategory::Arguments, "x")]);

        assert!(diff(&original, &other, &Configuration::default()).is_empty());

        let config = Configuration::default().with_accept_original_orphans(true);
        let candidates = diff(&original, &other, &config);
        assert_eq!(names(&candidates), vec!["a"]);
        assert!(candidates[0].other_appearances.is_empty());

        let config = Configuration::default().with_accept_replay_orphans(true);
        let candidates = diff(&original, &other, &config);
        assert_eq!(names(&candidates), vec!["b"]);
        assert!(candidates[0].original_appearances.is_empty());
    }

    #[test]
    fn test_equal_sets_in_any_order_are_suppressed() {
        let original = trace_of(vec![
            appearance("id", "11", SourceCategory::UrlQuery, "a"),
            appearance("id", "22", SourceCategory::UrlQuery, "b"),
        ]);
        let other = trace_of(vec![
            appearance("id", "22", SourceCategory::UrlQuery, "b"),
            appearance("id", "11", SourceCategory::UrlQuery, "a"),
        ]);

        assert!(diff(&original, &other, &Configuration::default()).is_empty());

        let config = Configuration::default().with_accept_equal_appearances(true);
        let candidates = diff(&original, &other, &config);
        assert_eq!(names(&candidates), vec!["id"]);
        assert!(candidates[0].other_appearances.is_empty());
    }

    #[test]
    fn test_requested_parameters_are_forced_in() {
        let original = trace_of(vec![appearance("keep", "same", SourceCategory::Arguments, "x")]);
        let other = original.clone();
        let mut config = Configuration::default();
        config.add_requested_parameters(["keep"]);

        let candidates = diff(&original, &other, &config);

        assert_eq!(names(&candidates), vec!["keep"]);
        assert!(candidates[0].other_appearances.is_empty());
    }

    #[test]
    fn test_oversized_parameters_are_skipped() {
        let original = trace_of(vec![
            appearance("id", "11", SourceCategory::UrlQuery, "a"),
            appearance("id", "22", SourceCategory::UrlQuery, "b"),
        ]);
        let other = trace_of(vec![appearance("id", "33", SourceCategory::UrlQuery, "a")]);
        let mut config = Configuration::default();
        config.set_max_number_of_appearances(1);

        assert!(diff(&original, &other, &config).is_empty());

        config.set_max_number_of_appearances(-1);
        assert_eq!(diff(&original, &other, &config).len(), 1);
    }

    #[test]
    fn test_parameterization_is_flagged() {
        let original = trace_of(vec![appearance("sid", "${sid#0}", SourceCategory::Arguments, "x")]);
        let other = trace_of(vec![appearance("sid", "s-200", SourceCategory::Arguments, "x")]);

        let candidates = diff(&original, &other, &Configuration::default());

        assert!(candidates[0].flagged_parameterization);
    }

    #[test]
    fn test_failed_replay_uses_recording_on_both_sides() {
        let recording = trace_of(vec![
            appearance("token", "tk-1", SourceCategory::Arguments, "submit"),
            appearance("page", "p-1", SourceCategory::UrlQuery, "home"),
        ]);
        let replay = trace_of(vec![
            appearance("token", "tk-1", SourceCategory::Arguments, "submit"),
            appearance("fresh", "f-1", SourceCategory::Arguments, "submit"),
        ]);

        let candidates = diff_failed_replay(&recording, &replay);

        assert_eq!(names(&candidates), vec!["token"]);
        assert_eq!(candidates[0].original_appearances, candidates[0].other_appearances);
        assert_eq!(candidates[0].all_appearances().count(), 2);
    }
}
