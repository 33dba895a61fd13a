//! Instantiation of candidate sorts
//!
//! Resolves a candidate name in a namespace and runs its context constructor.
//! A name that does not resolve is not an error: discovery may list names
//! that are not sorts at all.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::contract::{ContextHandle, SortAlgorithm, SortAxis};
use crate::namespace::{ModuleGuard, Namespace, Origin, QualifiedName};

/// A live, constructed sort bound to the shared context
pub struct Descriptor {
    // Declared before the guard so the instance is dropped while its module
    // is still loaded.
    instance: Box<dyn SortAlgorithm>,
    name: QualifiedName,
    origin: Origin,
    _guard: Option<ModuleGuard>,
}

impl Descriptor {
    pub fn new(
        name: QualifiedName,
        origin: Origin,
        instance: Box<dyn SortAlgorithm>,
        guard: Option<ModuleGuard>,
    ) -> Self {
        Self {
            instance,
            name,
            origin,
            _guard: guard,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn sort(&self) -> &dyn SortAlgorithm {
        self.instance.as_ref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn axis(&self) -> SortAxis {
        self.instance.axis()
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("list_name", &self.instance.list_name())
            .field("axis", &self.instance.axis())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Result of trying to build a candidate
#[derive(Debug)]
pub enum Instantiation {
    /// No such type in the namespace; skip silently
    NotFound,
    /// The type exists but could not be constructed
    Failed { detail: String },
    Built(Descriptor),
}

/// Resolve `name` in `namespace` and construct it with `context`.
///
/// A missing constructor, a constructor error and a constructor panic all
/// count as [`Instantiation::Failed`].
pub fn instantiate(
    name: &QualifiedName,
    namespace: &Namespace,
    context: &ContextHandle,
) -> Instantiation {
    let entry = match namespace.resolve(name) {
        Some(entry) => entry,
        None => {
            debug!(%name, "type not found, skipping");
            return Instantiation::NotFound;
        }
    };

    let constructor = match entry.constructor {
        Some(constructor) => constructor,
        None => {
            return Instantiation::Failed {
                detail: format!("{} has no context constructor", name),
            }
        }
    };

    let ctx = context.clone();
    let trampoline = namespace.trampoline();
    let construct = move || match trampoline {
        Some(trampoline) => trampoline(constructor, ctx),
        None => constructor(ctx),
    };
    match panic::catch_unwind(AssertUnwindSafe(construct)) {
        Ok(Ok(instance)) => Instantiation::Built(Descriptor::new(
            name.clone(),
            entry.origin.clone(),
            instance,
            namespace.guard().cloned(),
        )),
        Ok(Err(e)) => Instantiation::Failed {
            detail: e.to_string(),
        },
        Err(payload) => Instantiation::Failed {
            detail: format!("constructor panicked: {}", panic_message(payload.as_ref())),
        },
    }
}

/// Text of a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
