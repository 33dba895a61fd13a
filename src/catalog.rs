//! Sort Catalog
//!
//! Ties discovery, the compilation bridge, instantiation, validation, linting
//! and the registry together behind the operations callers use.
//!
//! ```text
//! scan:    namespace ─┐
//!          plugin dirs ─> names ─> instantiate ─> validate ─┬─> registry (axis list)
//!                                                           │   + suggestions
//! import:  file ─> compile ─> load (cache scope) ─┘          └─> diagnostics
//! ```
//!
//! Single-threaded: every mutating operation takes `&mut self`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bridge::{Bridge, DylibLoader, RustcCompiler};
use crate::config::CatalogConfig;
use crate::contract::{ContextHandle, SortAlgorithm, SortAxis};
use crate::discovery::{find_module_libraries, scan_namespace, ScanFilter};
use crate::error::{CatalogError, Result};
use crate::instantiate::{instantiate, Instantiation};
use crate::lint::SuggestionLinter;
use crate::namespace::{Namespace, QualifiedName, SortTypeId};
use crate::observer::{CatalogObserver, TracingObserver};
use crate::ordering::SortOrdering;
use crate::registry::{Diagnostic, SortRegistry, SortSummary};
use crate::sorts;
use crate::validate::{validate, Rejection};

/// Diagnostic reason for candidates whose constructor could not run
pub const FAILED_TO_COMPILE: &str = "failed to compile";

/// Diagnostic reason for plugin libraries that could not be opened
pub const FAILED_TO_LOAD: &str = "failed to load";

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(SortAxis),
    NotFound,
    Failed(String),
    Rejected(Rejection),
}

/// Counts from one discovery run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub modules: usize,
}

/// A fuzzy search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub summary: SortSummary,
    pub score: i64,
}

/// Serializable snapshot of the whole catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogReport {
    pub generated_at: DateTime<Utc>,
    pub comparison: Vec<SortSummary>,
    pub distribution: Vec<SortSummary>,
    pub categories: Vec<String>,
    pub diagnostics: Option<Vec<String>>,
    pub suggestions: Option<Vec<String>>,
}

impl CatalogReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The sort catalog
pub struct Catalog {
    context: ContextHandle,
    namespace: Namespace,
    filter: ScanFilter,
    plugin_dirs: Vec<PathBuf>,
    bridge: Bridge,
    linter: SuggestionLinter,
    ordering: Box<dyn SortOrdering>,
    observer: Box<dyn CatalogObserver>,
    registry: SortRegistry,
    /// Record keys produced by `import_single` rather than by a scan
    imported: BTreeSet<String>,
}

impl Catalog {
    /// Catalog over `namespace`, with collaborators taken from `config`
    pub fn new(config: &CatalogConfig, namespace: Namespace) -> Self {
        let bridge = Bridge::new(
            config.namespace.cache_dir.clone(),
            Box::new(RustcCompiler::new(config.compiler.clone())),
            Box::new(DylibLoader::new()),
        );

        Self {
            context: Arc::new(config.context.clone()),
            namespace,
            filter: config.namespace.scan_filter(),
            plugin_dirs: config.namespace.plugin_dirs.clone(),
            bridge,
            linter: SuggestionLinter::new(),
            ordering: config.ordering.strategy.into_ordering(),
            observer: Box::new(TracingObserver),
            registry: SortRegistry::new(),
            imported: BTreeSet::new(),
        }
    }

    /// Catalog over the built-in sorts
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Ok(Self::new(config, sorts::builtin_namespace()?))
    }

    /// Replace the ordering strategy
    pub fn with_ordering(mut self, ordering: Box<dyn SortOrdering>) -> Self {
        self.ordering = ordering;
        self
    }

    /// Replace the observer that presents errors and confirmations
    pub fn with_observer(mut self, observer: Box<dyn CatalogObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the compile/load bridge
    pub fn with_bridge(mut self, bridge: Bridge) -> Self {
        self.filter.excluded_paths = vec![bridge.cache_dir().to_path_buf()];
        self.bridge = bridge;
        self
    }

    pub fn registry(&self) -> &SortRegistry {
        &self.registry
    }

    /// Discover every candidate and register the ones that validate.
    ///
    /// Records from the previous scan are dropped first and imported sorts
    /// are kept, so the registry reflects what is discoverable now. A plugin
    /// directory walk failure is reported and aborts this run before the
    /// registry is touched.
    pub fn scan_and_register_all(&mut self) -> Result<ScanStats> {
        let libraries = match find_module_libraries(&self.plugin_dirs, &self.filter) {
            Ok(libraries) => libraries,
            Err(e) => {
                self.observer.report_error("Sort discovery", &e);
                return Err(e);
            }
        };

        let imported = &self.imported;
        self.registry.retain(|key| imported.contains(key));

        let mut stats = ScanStats::default();

        for name in scan_namespace(&self.namespace, &self.filter) {
            self.count(&mut stats, &name, None);
        }

        for library in libraries {
            let module = match self.bridge.load_prebuilt(&library) {
                Ok(module) => module,
                Err(e) => {
                    warn!(library = %library.display(), error = %e, "could not load plugin library");
                    self.observer.report_error(&format!("Could not load {}", library.display()), &e);
                    self.registry
                        .reject(Diagnostic::new(library.display().to_string(), FAILED_TO_LOAD));
                    stats.rejected += 1;
                    continue;
                }
            };
            stats.modules += 1;
            for name in scan_namespace(&module, &self.filter) {
                self.count(&mut stats, &name, Some(&module));
            }
        }

        self.reorder();
        info!(
            candidates = stats.candidates,
            accepted = stats.accepted,
            rejected = stats.rejected,
            modules = stats.modules,
            "sort discovery finished"
        );
        Ok(stats)
    }

    fn count(&mut self, stats: &mut ScanStats, name: &QualifiedName, module: Option<&Namespace>) {
        stats.candidates += 1;
        let outcome = self.register_candidate(name, module);
        if outcome != Outcome::NotFound {
            self.imported.remove(name.as_str());
        }
        match outcome {
            Outcome::Accepted(_) => stats.accepted += 1,
            Outcome::NotFound => {}
            Outcome::Failed(_) | Outcome::Rejected(_) => stats.rejected += 1,
        }
    }

    /// Instantiate, validate and register one candidate.
    ///
    /// `module` is the namespace of a loaded module; `None` resolves in the
    /// main program's namespace.
    pub fn register_candidate(
        &mut self,
        name: &QualifiedName,
        module: Option<&Namespace>,
    ) -> Outcome {
        let namespace = module.unwrap_or(&self.namespace);

        let descriptor = match instantiate(name, namespace, &self.context) {
            Instantiation::NotFound => return Outcome::NotFound,
            Instantiation::Failed { detail } => {
                warn!(%name, %detail, "sort could not be constructed");
                let err = CatalogError::Instantiation {
                    name: name.to_string(),
                    detail: detail.clone(),
                };
                self.observer
                    .report_error(&format!("Could not compile {}", name), &err);
                self.registry
                    .reject(Diagnostic::new(name.as_str(), FAILED_TO_COMPILE));
                return Outcome::Failed(detail);
            }
            Instantiation::Built(descriptor) => descriptor,
        };

        if let Err(rejection) = validate(descriptor.sort()) {
            debug!(%name, reason = rejection.reason(), "sort rejected");
            self.registry
                .reject(Diagnostic::new(name.as_str(), rejection.reason()));
            return Outcome::Rejected(rejection);
        }

        let suggestions = self.linter.lint(descriptor.sort()).text();
        let axis = descriptor.axis();
        self.registry.register(descriptor);
        self.registry.suggest(name, suggestions);
        debug!(%name, %axis, "sort registered");
        Outcome::Accepted(axis)
    }

    /// Compile, load and register a single source file.
    ///
    /// With `notify`, a successful import also reorders the lists and tells
    /// the observer. Batch importers pass `false` and call [`reorder`](Self::reorder)
    /// once at the end.
    pub fn import_single(&mut self, path: &Path, notify: bool) -> Result<SortTypeId> {
        let (target, module) = match self.bridge.build(path) {
            Ok(built) => built,
            Err(e) => {
                self.observer.report_error("Sort Import", &e);
                return Err(e);
            }
        };
        let name = target.name;

        let outcome = self.register_candidate(&name, Some(&module));
        if outcome != Outcome::NotFound {
            self.imported.insert(name.to_string());
        }
        match outcome {
            Outcome::Accepted(_) => {}
            Outcome::NotFound => {
                let err = CatalogError::CandidateNotFound(name.to_string());
                self.observer.report_error("Sort Import", &err);
                return Err(err);
            }
            Outcome::Failed(detail) => {
                return Err(CatalogError::Instantiation {
                    name: name.to_string(),
                    detail,
                })
            }
            Outcome::Rejected(rejection) => {
                return Err(CatalogError::Rejected {
                    name: name.to_string(),
                    reason: rejection.reason().to_string(),
                })
            }
        }

        if notify {
            self.reorder();
            self.observer.sorts_changed();
            self.observer
                .import_confirmed(&format!("Successfully imported sort {}", name));
        }
        Ok(name)
    }

    /// Order both axis lists with the configured strategy
    pub fn reorder(&mut self) {
        self.registry.reorder(self.ordering.as_ref());
    }

    pub fn comparison_summaries(&self) -> Vec<SortSummary> {
        self.registry.export_summaries(SortAxis::Comparison)
    }

    pub fn distribution_summaries(&self) -> Vec<SortSummary> {
        self.registry.export_summaries(SortAxis::Distribution)
    }

    /// Rejected candidates as "<name> (<reason>)", `None` if there are none
    pub fn diagnostics(&self) -> Option<Vec<String>> {
        self.registry.export_diagnostics()
    }

    /// Suggestion texts, `None` if there are none
    pub fn suggestions(&self) -> Option<Vec<String>> {
        self.registry.export_suggestions()
    }

    /// The accepted sort behind a summary
    pub fn sort(&self, id: &SortTypeId) -> Option<&dyn SortAlgorithm> {
        self.registry.get(id).map(|d| d.sort())
    }

    /// Search accepted sorts by "Choose Sort" name (fuzzy)
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<SearchResult> = self
            .comparison_summaries()
            .into_iter()
            .chain(self.distribution_summaries())
            .filter_map(|summary| {
                matcher
                    .fuzzy_match(&summary.list_name, query)
                    .map(|score| SearchResult { summary, score })
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(limit);
        results
    }

    /// Snapshot of everything a front end needs
    pub fn report(&self) -> CatalogReport {
        let comparison = self.comparison_summaries();
        let distribution = self.distribution_summaries();
        let mut all = comparison.clone();
        all.extend(distribution.iter().cloned());

        CatalogReport {
            generated_at: Utc::now(),
            categories: SortSummary::categories(&all),
            comparison,
            distribution,
            diagnostics: self.diagnostics(),
            suggestions: self.suggestions(),
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("namespace", &self.namespace)
            .field("filter", &self.filter)
            .field("bridge", &self.bridge)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
