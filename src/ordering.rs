//! Display ordering strategies
//!
//! The registry never decides how sorts are ranked; it applies whatever
//! [`SortOrdering`] it was given. Every built-in strategy ends on the
//! fully-qualified name, which is unique, so each one is a total order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::instantiate::Descriptor;

/// A total order over accepted sorts
pub trait SortOrdering: Send + Sync {
    fn compare(&self, a: &Descriptor, b: &Descriptor) -> Ordering;
}

impl<F> SortOrdering for F
where
    F: Fn(&Descriptor, &Descriptor) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &Descriptor, b: &Descriptor) -> Ordering {
        self(a, b)
    }
}

/// Built-in strategies selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Category, then "Choose Sort" name
    #[default]
    CategoryThenName,
    /// "Choose Sort" name only
    ListName,
    /// Fully-qualified type name
    TypeName,
}

impl OrderingStrategy {
    pub fn into_ordering(self) -> Box<dyn SortOrdering> {
        match self {
            OrderingStrategy::CategoryThenName => Box::new(CategoryThenName),
            OrderingStrategy::ListName => Box::new(ByListName),
            OrderingStrategy::TypeName => Box::new(ByTypeName),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryThenName;

impl SortOrdering for CategoryThenName {
    fn compare(&self, a: &Descriptor, b: &Descriptor) -> Ordering {
        a.sort()
            .category()
            .cmp(b.sort().category())
            .then_with(|| a.sort().list_name().cmp(b.sort().list_name()))
            .then_with(|| a.name().cmp(b.name()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByListName;

impl SortOrdering for ByListName {
    fn compare(&self, a: &Descriptor, b: &Descriptor) -> Ordering {
        a.sort()
            .list_name()
            .cmp(b.sort().list_name())
            .then_with(|| a.name().cmp(b.name()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByTypeName;

impl SortOrdering for ByTypeName {
    fn compare(&self, a: &Descriptor, b: &Descriptor) -> Ordering {
        a.name().cmp(b.name())
    }
}
