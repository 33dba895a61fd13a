//! Sort Catalog
//!
//! Discovers, loads, validates and classifies sorting algorithms for a
//! sorting visualizer.
//!
//! ## Features
//!
//! - **Discovery**: built-in sorts register into a namespace; plugin
//!   libraries are picked up from configured directories
//! - **Runtime Import**: a single source file is compiled with `rustc` into a
//!   cache directory and loaded in its own scope
//! - **Validation**: disabled sorts and sorts missing display names are
//!   rejected with a recorded reason
//! - **Suggestions**: inconsistent metadata is reported without rejecting
//! - **Ordering**: the classified lists follow an injected strategy
//!
//! ## Architecture
//!
//! ```text
//! sorts.*            (built-in namespace)
//! plugins/*.so       (prebuilt modules)      ─┐
//! cache/             (compiled imports)       ├─> Catalog ─> SortRegistry
//!   src/<pkg>/<Name>.rs                       │              ├── comparison
//!   <crate>_<sha>.so                         ─┘              ├── distribution
//!                                                            ├── diagnostics
//!                                                            └── suggestions
//! ```

pub mod bridge;
pub mod catalog;
pub mod checksum;
pub mod config;
pub mod contract;
pub mod discovery;
pub mod error;
pub mod instantiate;
pub mod lint;
pub mod namespace;
pub mod observer;
pub mod ordering;
pub mod registry;
pub mod sorts;
pub mod validate;
pub mod version;

pub use bridge::{Bridge, Compiler, ModuleDeclaration, ModuleLoader};
pub use catalog::{Catalog, CatalogReport, Outcome, ScanStats, SearchResult};
pub use config::CatalogConfig;
pub use contract::{ContextHandle, ProfiledSort, SortAlgorithm, SortAxis, SortProfile, VisualContext};
pub use error::{CatalogError, Result};
pub use namespace::{ConstructResult, Namespace, QualifiedName, SortTypeId};
pub use observer::{CatalogObserver, TracingObserver};
pub use ordering::{OrderingStrategy, SortOrdering};
pub use registry::{Diagnostic, SortRegistry, SortSummary};
pub use validate::Rejection;
pub use version::{CatalogVersion, CATALOG_VERSION};
