//! Sort Metadata Linting
//!
//! Advisory checks over the flags a sort declares. Suggestions never block a
//! sort from being registered; they only tell the author that the declared
//! metadata looks inconsistent.
//!
//! ## Lints
//! 1. **BOGO_NOT_SLOW**: a bogosort that is not marked unreasonably slow
//! 2. **ZERO_LIMIT**: unreasonably slow with a limit of 0 warns on every selection
//! 3. **STRAY_LIMIT**: a nonzero limit on a sort that is not marked slow
//! 4. **RADIX_WITHOUT_BUCKETS**: radix sorts are bucket sorts too
//! 5. **RADIX_COMPARISON**: radix sorts are not comparison-based

use crate::contract::SortAlgorithm;

/// Result of linting one sort
#[derive(Debug, Default)]
pub struct LintResult {
    pub sort_name: String,
    pub suggestions: Vec<Suggestion>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// One `- `-prefixed line per suggestion, newline-joined, no trailing newline.
    /// Empty when clean.
    pub fn text(&self) -> String {
        self.suggestions
            .iter()
            .map(|s| format!("- {}", s.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub code: &'static str,
    pub message: String,
}

/// One advisory rule
struct Rule {
    code: &'static str,
    applies: fn(&dyn SortAlgorithm) -> bool,
    message: fn(&str) -> String,
}

/// The sort metadata linter
pub struct SuggestionLinter {
    rules: Vec<Rule>,
}

impl Default for SuggestionLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionLinter {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule {
                    code: "BOGO_NOT_SLOW",
                    applies: |s| s.is_bogo() && !s.is_unreasonably_slow(),
                    message: |name| {
                        format!("{} is a bogosort. It should be marked 'unreasonably slow'.", name)
                    },
                },
                Rule {
                    code: "ZERO_LIMIT",
                    applies: |s| s.is_unreasonably_slow() && s.unreasonable_limit() == 0,
                    message: |name| {
                        format!(
                            "A warning will pop up every time you select {}. You might want to change its 'unreasonable limit'.",
                            name
                        )
                    },
                },
                Rule {
                    code: "STRAY_LIMIT",
                    applies: |s| !s.is_unreasonably_slow() && s.unreasonable_limit() != 0,
                    message: |name| {
                        format!(
                            "You might want to set {}'s 'unreasonable limit' to 0. It's not marked 'unreasonably slow'.",
                            name
                        )
                    },
                },
                Rule {
                    code: "RADIX_WITHOUT_BUCKETS",
                    applies: |s| s.is_radix() && !s.uses_buckets(),
                    message: |name| {
                        format!("{} is a radix sort and should also be classified as a bucket sort.", name)
                    },
                },
                Rule {
                    code: "RADIX_COMPARISON",
                    applies: |s| s.is_radix() && s.axis().is_comparison(),
                    message: |name| {
                        format!(
                            "{} is a radix sort. It probably shouldn't be labelled as a comparison-based sort.",
                            name
                        )
                    },
                },
            ],
        }
    }

    /// Run every rule against `sort`
    pub fn lint(&self, sort: &dyn SortAlgorithm) -> LintResult {
        let name = sort.run_name();
        let suggestions = self
            .rules
            .iter()
            .filter(|rule| (rule.applies)(sort))
            .map(|rule| Suggestion {
                code: rule.code,
                message: (rule.message)(name),
            })
            .collect();

        LintResult {
            sort_name: name.to_string(),
            suggestions,
        }
    }
}
