//! Isolated module loading
//!
//! A compiled sort module is a dynamic library exporting one
//! [`ModuleDeclaration`] under [`DECLARATION_SYMBOL`]. Loading opens the
//! library with local symbol binding, checks the declared catalog version,
//! and lets the module register its types into a fresh [`Namespace`] that
//! belongs to that module alone.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use tracing::{debug, info};

use crate::contract::ContextHandle;
use crate::error::{CatalogError, Result};
use crate::instantiate::panic_message;
use crate::namespace::{ConstructResult, Constructor, Namespace, Trampoline};
use crate::version::CatalogVersion;

/// Exported symbol every module must define (see [`declare_sort_module!`](crate::declare_sort_module))
pub const DECLARATION_SYMBOL: &[u8] = b"SORT_CATALOG_MODULE\0";

/// What a module exports
#[derive(Clone, Copy)]
pub struct ModuleDeclaration {
    /// Catalog version the module was compiled against
    pub catalog_version: &'static str,
    /// Registers the module's sort types
    pub register: fn(&mut Namespace) -> Result<()>,
    /// Runs the module's constructors
    pub construct: Trampoline,
}

// A module links its own copy of std, and a panic unwinding out of it cannot
// be caught by the host. The two functions below are referenced from
// `declare_sort_module!`, so each module compiles them into itself and
// catches its panics before returning to the host.

#[doc(hidden)]
pub fn guarded_construct(constructor: Constructor, context: ContextHandle) -> ConstructResult {
    match panic::catch_unwind(AssertUnwindSafe(|| constructor(context))) {
        Ok(result) => result,
        Err(payload) => {
            Err(format!("constructor panicked: {}", panic_message(payload.as_ref())).into())
        }
    }
}

#[doc(hidden)]
pub fn guarded_register(
    register: fn(&mut Namespace) -> Result<()>,
    namespace: &mut Namespace,
) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| register(namespace))) {
        Ok(result) => result,
        Err(payload) => Err(CatalogError::ModulePanic(panic_message(payload.as_ref()))),
    }
}

/// Declare the registration function of a sort module.
///
/// ```rust,ignore
/// package sorts.custom;
///
/// use sort_catalog::{ContextHandle, ConstructResult, Namespace, ProfiledSort, SortAxis, SortProfile};
///
/// fn build(ctx: ContextHandle) -> ConstructResult {
///     Ok(Box::new(ProfiledSort::new(ctx, SortProfile::new(
///         "Stooge", "Stooge Sort", "Stooge sort", "Impractical Sorts", SortAxis::Comparison,
///     ))))
/// }
///
/// fn register(ns: &mut Namespace) -> sort_catalog::Result<()> {
///     ns.register("sorts.custom.StoogeSort", build)
/// }
///
/// sort_catalog::declare_sort_module!(register);
/// ```
#[macro_export]
macro_rules! declare_sort_module {
    ($register:path) => {
        #[doc(hidden)]
        fn __sort_catalog_register(
            namespace: &mut $crate::Namespace,
        ) -> $crate::Result<()> {
            $crate::bridge::loader::guarded_register($register, namespace)
        }

        #[doc(hidden)]
        #[no_mangle]
        pub static SORT_CATALOG_MODULE: $crate::ModuleDeclaration = $crate::ModuleDeclaration {
            catalog_version: $crate::CATALOG_VERSION,
            register: __sort_catalog_register,
            construct: $crate::bridge::loader::guarded_construct,
        };
    };
}

/// Loads compiled modules
pub trait ModuleLoader {
    /// Load `artifact`, which must lie inside `scope`, into its own namespace
    fn load(&self, scope: &Path, artifact: &Path) -> Result<Namespace>;
}

/// An opened library; kept alive by every namespace entry and descriptor built from it
pub struct LoadedLibrary {
    path: PathBuf,
    _library: Library,
}

impl Drop for LoadedLibrary {
    fn drop(&mut self) {
        debug!(module = %self.path.display(), "unloading sort module");
    }
}

/// Loads `cdylib` modules with `libloading`
#[derive(Debug, Clone)]
pub struct DylibLoader {
    host: CatalogVersion,
}

impl DylibLoader {
    pub fn new() -> Self {
        Self {
            host: CatalogVersion::current(),
        }
    }

    /// Check that `artifact` resolves to a file under `scope`
    pub fn check_scope(scope: &Path, artifact: &Path) -> Result<PathBuf> {
        let scope = scope.canonicalize()?;
        let artifact = artifact.canonicalize()?;
        if !artifact.starts_with(&scope) {
            return Err(CatalogError::OutsideScope {
                path: artifact,
                scope,
            });
        }
        Ok(artifact)
    }

    fn check_version(&self, path: &Path, declared: &str) -> Result<()> {
        let found = CatalogVersion::parse(declared)?;
        if !found.is_compatible_with(&self.host) {
            return Err(CatalogError::IncompatibleModule {
                path: path.to_path_buf(),
                found: found.to_string(),
                expected: self.host.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DylibLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for DylibLoader {
    fn load(&self, scope: &Path, artifact: &Path) -> Result<Namespace> {
        let path = Self::check_scope(scope, artifact)?;
        let load_error = |message: String| CatalogError::Load {
            path: path.clone(),
            message,
        };

        // SAFETY: the artifact was produced by the configured compiler (or
        // placed in a plugin directory by the operator). Library::new opens it
        // with RTLD_LOCAL on unix, so its symbols stay out of the global scope.
        let library = unsafe { Library::new(&path) }.map_err(|e| load_error(e.to_string()))?;

        // SAFETY: the symbol is defined by `declare_sort_module!` as a
        // `ModuleDeclaration` static.
        let declaration: ModuleDeclaration = unsafe {
            let symbol = library
                .get::<*const ModuleDeclaration>(DECLARATION_SYMBOL)
                .map_err(|e| load_error(e.to_string()))?;
            **symbol
        };

        self.check_version(&path, declaration.catalog_version)?;

        let mut namespace = Namespace::for_module(&path);
        namespace.set_trampoline(declaration.construct);
        (declaration.register)(&mut namespace).map_err(|e| load_error(e.to_string()))?;
        debug!(module = %path.display(), types = namespace.len(), "module registered its types");

        namespace.attach_guard(Arc::new(LoadedLibrary {
            path: path.clone(),
            _library: library,
        }));
        info!(module = %path.display(), "loaded sort module");
        Ok(namespace)
    }
}
