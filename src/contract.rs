//! The capability contract every sort implementation exposes
//!
//! A sort is described by a [`SortProfile`]: the display names the front end
//! shows, a category, the axis it is classified on, and a handful of advisory
//! flags the suggestion linter looks at. Implementations receive the shared
//! [`ContextHandle`] at construction and keep it for as long as they live.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Classification axis of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAxis {
    /// Orders elements by comparing them with each other
    Comparison,
    /// Orders elements by distributing them (counting, buckets, digits)
    Distribution,
}

impl SortAxis {
    pub fn from_comparison_flag(comparison_based: bool) -> Self {
        if comparison_based {
            SortAxis::Comparison
        } else {
            SortAxis::Distribution
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, SortAxis::Comparison)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortAxis::Comparison => "comparison",
            SortAxis::Distribution => "distribution",
        }
    }
}

impl fmt::Display for SortAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared, read-only state handed to every sort constructor.
///
/// The rendering engine owns the real visualizer; the catalog only passes this
/// handle through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualContext {
    /// Largest array the visualizer will ever hand to a sort
    pub max_array_length: usize,
}

impl VisualContext {
    pub fn new(max_array_length: usize) -> Self {
        Self { max_array_length }
    }
}

impl Default for VisualContext {
    fn default() -> Self {
        Self::new(16384)
    }
}

/// Shared handle to the visualization context
pub type ContextHandle = Arc<VisualContext>;

/// Declared metadata of a sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortProfile {
    /// Sorts can be switched off without removing them
    pub enabled: bool,
    /// Name shown in the "Choose Sort" menu
    pub list_name: String,
    /// Name shown while "Run All" is playing
    pub run_all_name: String,
    /// Name shown while this single sort runs
    pub run_name: String,
    /// Menu category, e.g. "Exchange Sorts"
    pub category: String,
    pub axis: SortAxis,
    pub bogo: bool,
    pub unreasonably_slow: bool,
    /// Array length above which the front end warns before running
    pub unreasonable_limit: u64,
    pub radix: bool,
    pub uses_buckets: bool,
}

impl SortProfile {
    /// Create an enabled profile with all three display names and a category.
    ///
    /// Advisory flags start cleared; use the `with_*` helpers to set them.
    pub fn new(
        list_name: impl Into<String>,
        run_all_name: impl Into<String>,
        run_name: impl Into<String>,
        category: impl Into<String>,
        axis: SortAxis,
    ) -> Self {
        Self {
            enabled: true,
            list_name: list_name.into(),
            run_all_name: run_all_name.into(),
            run_name: run_name.into(),
            category: category.into(),
            axis,
            bogo: false,
            unreasonably_slow: false,
            unreasonable_limit: 0,
            radix: false,
            uses_buckets: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_bogo(mut self) -> Self {
        self.bogo = true;
        self
    }

    pub fn with_unreasonable_limit(mut self, limit: u64) -> Self {
        self.unreasonably_slow = true;
        self.unreasonable_limit = limit;
        self
    }

    pub fn with_radix(mut self) -> Self {
        self.radix = true;
        self
    }

    pub fn with_buckets(mut self) -> Self {
        self.uses_buckets = true;
        self
    }
}

/// Capability contract of a pluggable sort.
///
/// Only [`profile`](SortAlgorithm::profile) and
/// [`context`](SortAlgorithm::context) are required. The accessors read the
/// profile by default and may be overridden when a value is computed.
pub trait SortAlgorithm: Send + Sync {
    fn profile(&self) -> &SortProfile;

    /// The context handle this sort was constructed with
    fn context(&self) -> &ContextHandle;

    fn is_enabled(&self) -> bool {
        self.profile().enabled
    }

    fn list_name(&self) -> &str {
        &self.profile().list_name
    }

    fn run_all_name(&self) -> &str {
        &self.profile().run_all_name
    }

    fn run_name(&self) -> &str {
        &self.profile().run_name
    }

    fn category(&self) -> &str {
        &self.profile().category
    }

    fn axis(&self) -> SortAxis {
        self.profile().axis
    }

    fn is_bogo(&self) -> bool {
        self.profile().bogo
    }

    fn is_unreasonably_slow(&self) -> bool {
        self.profile().unreasonably_slow
    }

    fn unreasonable_limit(&self) -> u64 {
        self.profile().unreasonable_limit
    }

    fn is_radix(&self) -> bool {
        self.profile().radix
    }

    fn uses_buckets(&self) -> bool {
        self.profile().uses_buckets
    }
}

/// A sort defined entirely by its profile.
///
/// Handy for plugins whose metadata is all the catalog needs, and for tests.
#[derive(Debug, Clone)]
pub struct ProfiledSort {
    profile: SortProfile,
    context: ContextHandle,
}

impl ProfiledSort {
    pub fn new(context: ContextHandle, profile: SortProfile) -> Self {
        Self { profile, context }
    }
}

impl SortAlgorithm for ProfiledSort {
    fn profile(&self) -> &SortProfile {
        &self.profile
    }

    fn context(&self) -> &ContextHandle {
        &self.context
    }
}
