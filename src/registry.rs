//! Sort Registry
//!
//! Holds accepted sorts split by axis, plus the diagnostics for rejected
//! candidates and the suggestions for accepted ones. Every record is keyed by
//! fully-qualified name: registering a name again replaces what was recorded
//! for it, so repeated scans never grow the registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::contract::SortAxis;
use crate::instantiate::Descriptor;
use crate::namespace::{QualifiedName, SortTypeId};
use crate::ordering::SortOrdering;

/// Read-only view of an accepted sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSummary {
    /// Position within its axis list
    pub id: usize,
    pub sort_type: SortTypeId,
    /// "Choose Sort" name
    pub list_name: String,
    pub category: String,
    pub uses_comparisons: bool,
}

impl SortSummary {
    /// Selection names in list order
    pub fn list_names(sorts: &[SortSummary]) -> Vec<String> {
        sorts.iter().map(|s| s.list_name.clone()).collect()
    }

    /// Distinct categories, alphabetically
    pub fn categories(sorts: &[SortSummary]) -> Vec<String> {
        sorts
            .iter()
            .map(|s| s.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Why a candidate is not in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Fully-qualified name, or a path for modules that failed to load
    pub candidate: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(candidate: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.candidate, self.reason)
    }
}

/// Accepted sorts, diagnostics and suggestions
#[derive(Debug, Default)]
pub struct SortRegistry {
    comparison: Vec<Descriptor>,
    distribution: Vec<Descriptor>,
    diagnostics: Vec<Diagnostic>,
    /// (candidate, suggestion text)
    suggestions: Vec<(QualifiedName, String)>,
}

impl SortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accepted sort to its axis list.
    ///
    /// Any earlier record for the same name (accepted on either axis, or
    /// rejected) is dropped first. No ordering happens here.
    pub fn register(&mut self, descriptor: Descriptor) {
        let name = descriptor.name().clone();
        self.forget(&name);
        match descriptor.axis() {
            SortAxis::Comparison => self.comparison.push(descriptor),
            SortAxis::Distribution => self.distribution.push(descriptor),
        }
    }

    /// Record a rejected candidate. It is removed from both axis lists.
    pub fn reject(&mut self, diagnostic: Diagnostic) {
        self.comparison
            .retain(|d| d.name().as_str() != diagnostic.candidate);
        self.distribution
            .retain(|d| d.name().as_str() != diagnostic.candidate);
        self.suggestions
            .retain(|(name, _)| name.as_str() != diagnostic.candidate);
        self.diagnostics
            .retain(|d| d.candidate != diagnostic.candidate);
        self.diagnostics.push(diagnostic);
    }

    /// Record suggestion text for an accepted sort; empty text is ignored
    pub fn suggest(&mut self, name: &QualifiedName, text: String) {
        self.suggestions.retain(|(n, _)| n != name);
        if !text.is_empty() {
            self.suggestions.push((name.clone(), text));
        }
    }

    fn forget(&mut self, name: &QualifiedName) {
        self.comparison.retain(|d| d.name() != name);
        self.distribution.retain(|d| d.name() != name);
        self.diagnostics.retain(|d| d.candidate != name.as_str());
        self.suggestions.retain(|(n, _)| n != name);
    }

    /// Stable sort of each axis list with `ordering`
    pub fn reorder(&mut self, ordering: &dyn SortOrdering) {
        self.comparison.sort_by(|a, b| ordering.compare(a, b));
        self.distribution.sort_by(|a, b| ordering.compare(a, b));
    }

    /// Keep only the records whose candidate key satisfies `keep`.
    ///
    /// The key is the qualified name, or the library path for modules that
    /// failed to load.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.comparison.retain(|d| keep(d.name().as_str()));
        self.distribution.retain(|d| keep(d.name().as_str()));
        self.diagnostics.retain(|d| keep(&d.candidate));
        self.suggestions.retain(|(name, _)| keep(name.as_str()));
    }

    pub fn sorts(&self, axis: SortAxis) -> &[Descriptor] {
        match axis {
            SortAxis::Comparison => &self.comparison,
            SortAxis::Distribution => &self.distribution,
        }
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&Descriptor> {
        self.comparison
            .iter()
            .chain(self.distribution.iter())
            .find(|d| d.name() == name)
    }

    pub fn len(&self) -> usize {
        self.comparison.len() + self.distribution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh summaries of one axis, in current order
    pub fn export_summaries(&self, axis: SortAxis) -> Vec<SortSummary> {
        self.sorts(axis)
            .iter()
            .enumerate()
            .map(|(id, d)| SortSummary {
                id,
                sort_type: d.name().clone(),
                list_name: d.sort().list_name().to_string(),
                category: d.sort().category().to_string(),
                uses_comparisons: axis.is_comparison(),
            })
            .collect()
    }

    /// `None` when nothing was rejected
    pub fn export_diagnostics(&self) -> Option<Vec<String>> {
        if self.diagnostics.is_empty() {
            return None;
        }
        Some(self.diagnostics.iter().map(|d| d.to_string()).collect())
    }

    /// `None` when no accepted sort drew a suggestion
    pub fn export_suggestions(&self) -> Option<Vec<String>> {
        if self.suggestions.is_empty() {
            return None;
        }
        Some(self.suggestions.iter().map(|(_, text)| text.clone()).collect())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
