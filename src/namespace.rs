//! Type namespaces
//!
//! A [`Namespace`] is an index of sort types by fully-qualified dotted name.
//! The main program fills one at startup through explicit registration calls;
//! every loaded module gets its own namespace, filled by the module's exported
//! registration function, and that namespace is never merged into the main one.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::contract::{ContextHandle, SortAlgorithm};
use crate::error::{CatalogError, Result};

/// Outcome of running a sort constructor
pub type ConstructResult =
    std::result::Result<Box<dyn SortAlgorithm>, Box<dyn std::error::Error + Send + Sync>>;

/// The single-argument constructor taking the shared context handle
pub type Constructor = fn(ContextHandle) -> ConstructResult;

/// Runs a constructor on behalf of the host.
///
/// A loaded module exports its own so that the constructor runs, and any
/// panic is caught, inside the module's runtime.
pub type Trampoline = fn(Constructor, ContextHandle) -> ConstructResult;

/// Keeps whatever backs a namespace (e.g. an opened library) alive
pub type ModuleGuard = Arc<dyn Any + Send + Sync>;

/// Fully-qualified dotted type name, e.g. `sorts.exchange.BubbleSort`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName(String);

/// Type-identity handle exported with sort summaries
pub type SortTypeId = QualifiedName;

impl QualifiedName {
    /// Parse and validate a dotted name. Every segment must be an identifier.
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() || !name.split('.').all(is_identifier) {
            return Err(CatalogError::InvalidName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Build `<package>.<simple>`
    pub fn join(package: &str, simple: &str) -> Result<Self> {
        if package.is_empty() {
            return Self::parse(simple);
        }
        Self::parse(&format!("{}.{}", package, simple))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, empty for top-level names
    pub fn package(&self) -> &str {
        self.0.rfind('.').map(|i| &self.0[..i]).unwrap_or("")
    }

    /// Segment-wise prefix test: `sorts.templates.Sort` is within `sorts.templates`,
    /// `sorts.templatesX.Sort` is not.
    pub fn is_within(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return true;
        }
        match self.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.0
    }
}

/// Where a type was registered from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Compiled into the main program
    Builtin,
    /// Registered by the module at this path
    Module(PathBuf),
}

impl Origin {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Origin::Builtin => None,
            Origin::Module(path) => Some(path),
        }
    }
}

/// One registered type
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub name: QualifiedName,
    pub origin: Origin,
    /// Present for nested helper types
    pub enclosing: Option<QualifiedName>,
    /// `None` when the type has no context constructor
    pub constructor: Option<Constructor>,
}

impl TypeEntry {
    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }
}

/// An index of types by name
pub struct Namespace {
    origin: Origin,
    entries: BTreeMap<QualifiedName, TypeEntry>,
    trampoline: Option<Trampoline>,
    guard: Option<ModuleGuard>,
}

impl Namespace {
    /// Namespace of the main program
    pub fn builtin() -> Self {
        Self {
            origin: Origin::Builtin,
            entries: BTreeMap::new(),
            trampoline: None,
            guard: None,
        }
    }

    /// Namespace for the module loaded from `path`
    pub fn for_module(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::Module(path.into()),
            entries: BTreeMap::new(),
            trampoline: None,
            guard: None,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Register a type with its context constructor. Re-registering a name replaces it.
    pub fn register(&mut self, name: &str, constructor: Constructor) -> Result<()> {
        self.insert(QualifiedName::parse(name)?, None, Some(constructor));
        Ok(())
    }

    /// Register a type that exists but cannot be built from a context handle
    pub fn register_type(&mut self, name: &str) -> Result<()> {
        self.insert(QualifiedName::parse(name)?, None, None);
        Ok(())
    }

    /// Register a helper type nested inside `enclosing`
    pub fn register_nested(
        &mut self,
        enclosing: &str,
        simple_name: &str,
        constructor: Option<Constructor>,
    ) -> Result<()> {
        let outer = QualifiedName::parse(enclosing)?;
        let name = QualifiedName::join(outer.as_str(), simple_name)?;
        self.insert(name, Some(outer), constructor);
        Ok(())
    }

    fn insert(
        &mut self,
        name: QualifiedName,
        enclosing: Option<QualifiedName>,
        constructor: Option<Constructor>,
    ) {
        let entry = TypeEntry {
            name: name.clone(),
            origin: self.origin.clone(),
            enclosing,
            constructor,
        };
        self.entries.insert(name, entry);
    }

    /// Look up a type by name
    pub fn resolve(&self, name: &QualifiedName) -> Option<&TypeEntry> {
        self.entries.get(name)
    }

    /// All entries in name order
    pub fn entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Route every constructor of this namespace through `trampoline`
    pub fn set_trampoline(&mut self, trampoline: Trampoline) {
        self.trampoline = Some(trampoline);
    }

    pub fn trampoline(&self) -> Option<Trampoline> {
        self.trampoline
    }

    /// Attach the resource that must outlive every instance built from this namespace
    pub fn attach_guard(&mut self, guard: ModuleGuard) {
        self.guard = Some(guard);
    }

    pub fn guard(&self) -> Option<&ModuleGuard> {
        self.guard.as_ref()
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("origin", &self.origin)
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .field("trampoline", &self.trampoline.is_some())
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}
