//! Required-field validation
//!
//! Rules run in a fixed order and the first failure wins.

use std::fmt;

use crate::contract::SortAlgorithm;

/// Why a constructed sort was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Disabled,
    MissingListName,
    MissingRunAllName,
    MissingRunName,
    MissingCategory,
}

impl Rejection {
    /// Reason text recorded in diagnostics
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Disabled => "manually disabled",
            Rejection::MissingListName => "missing 'Choose Sort' name",
            Rejection::MissingRunAllName => "missing 'Run All' name",
            Rejection::MissingRunName => "missing 'Run Sort' name",
            Rejection::MissingCategory => "missing category",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Check a sort against the enablement and required-field rules
pub fn validate(sort: &dyn SortAlgorithm) -> Result<(), Rejection> {
    if !sort.is_enabled() {
        return Err(Rejection::Disabled);
    }
    if sort.list_name().is_empty() {
        return Err(Rejection::MissingListName);
    }
    if sort.run_all_name().is_empty() {
        return Err(Rejection::MissingRunAllName);
    }
    if sort.run_name().is_empty() {
        return Err(Rejection::MissingRunName);
    }
    if sort.category().is_empty() {
        return Err(Rejection::MissingCategory);
    }
    Ok(())
}
