//! Catalog integration tests
//!
//! Runs discovery and imports end to end with a fake compiler and a fake
//! module loader standing in for `rustc` and `libloading`.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rstest::rstest;
use tempfile::{tempdir, TempDir};

use sort_catalog::bridge::{CompileRequest, CompileStatus};
use sort_catalog::{
    Bridge, Catalog, CatalogConfig, CatalogError, CatalogObserver, Compiler, ConstructResult,
    ContextHandle, ModuleLoader, Namespace, OrderingStrategy, ProfiledSort, Result, SortAxis,
    SortProfile,
};

// =============================================================================
// Fakes
// =============================================================================

type Register = fn(&mut Namespace) -> Result<()>;

/// Pretends to compile by touching the artifact
struct TouchCompiler {
    code: i32,
    calls: Rc<RefCell<usize>>,
}

impl Compiler for TouchCompiler {
    fn compile(&self, request: &CompileRequest) -> CompileStatus {
        *self.calls.borrow_mut() += 1;
        if self.code != 0 {
            return CompileStatus::failed(self.code, "error[E0425]: cannot find value");
        }
        match fs::write(request.artifact_path(), b"") {
            Ok(()) => CompileStatus::succeeded(),
            Err(_) => CompileStatus::failed(1, "could not write artifact"),
        }
    }
}

/// Builds a module namespace with a fixed registration function
struct FakeLoader {
    register: Option<Register>,
}

impl ModuleLoader for FakeLoader {
    fn load(&self, _scope: &Path, artifact: &Path) -> Result<Namespace> {
        let register = self.register.ok_or_else(|| CatalogError::Load {
            path: artifact.to_path_buf(),
            message: "undefined symbol: SORT_CATALOG_MODULE".to_string(),
        })?;
        let mut namespace = Namespace::for_module(artifact);
        register(&mut namespace)?;
        Ok(namespace)
    }
}

/// Fails the first load, then behaves like `FakeLoader`
struct FlakyLoader {
    loads: Cell<usize>,
    register: Register,
}

impl ModuleLoader for FlakyLoader {
    fn load(&self, _scope: &Path, artifact: &Path) -> Result<Namespace> {
        self.loads.set(self.loads.get() + 1);
        if self.loads.get() == 1 {
            return Err(CatalogError::Load {
                path: artifact.to_path_buf(),
                message: "file too short".to_string(),
            });
        }
        let mut namespace = Namespace::for_module(artifact);
        (self.register)(&mut namespace)?;
        Ok(namespace)
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl CatalogObserver for Recorder {
    fn report_error(&self, context: &str, error: &CatalogError) {
        self.events
            .borrow_mut()
            .push(format!("error: {}: {}", context, error));
    }

    fn sorts_changed(&self) {
        self.events.borrow_mut().push("changed".to_string());
    }

    fn import_confirmed(&self, message: &str) {
        self.events.borrow_mut().push(message.to_string());
    }
}

struct Fixture {
    dir: TempDir,
    catalog: Catalog,
    recorder: Recorder,
    compiles: Rc<RefCell<usize>>,
}

impl Fixture {
    fn new(namespace: Namespace, register: Option<Register>) -> Self {
        Self::with_compiler(namespace, register, 0)
    }

    fn with_compiler(namespace: Namespace, register: Option<Register>, code: i32) -> Self {
        Self::with_loader(namespace, Box::new(FakeLoader { register }), code)
    }

    fn with_loader(namespace: Namespace, loader: Box<dyn ModuleLoader>, code: i32) -> Self {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache");
        let plugins = dir.path().join("plugins");

        let mut config = CatalogConfig::default();
        config.namespace.cache_dir = cache.clone();
        config.namespace.plugin_dirs = vec![plugins];

        let compiles = Rc::new(RefCell::new(0));
        let bridge = Bridge::new(
            cache,
            Box::new(TouchCompiler {
                code,
                calls: compiles.clone(),
            }),
            loader,
        );
        let recorder = Recorder::default();
        let catalog = Catalog::new(&config, namespace)
            .with_bridge(bridge)
            .with_observer(Box::new(recorder.clone()));

        Self {
            dir,
            catalog,
            recorder,
            compiles,
        }
    }

    fn source(&self, file: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(file);
        fs::write(&path, contents).unwrap();
        path
    }

    fn plugin(&self, stem: &str) -> PathBuf {
        let plugins = self.dir.path().join("plugins");
        fs::create_dir_all(&plugins).unwrap();
        let path = plugins.join(format!(
            "{}{}{}",
            std::env::consts::DLL_PREFIX,
            stem,
            std::env::consts::DLL_SUFFIX
        ));
        fs::write(&path, b"").unwrap();
        path
    }
}

// =============================================================================
// Sort types
// =============================================================================

fn profiled(ctx: ContextHandle, profile: SortProfile) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(ctx, profile)))
}

fn stooge(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("Stooge", "Stooge Sort", "Stooge sort", "Impractical Sorts", SortAxis::Comparison),
    )
}

fn uncategorized_stooge(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("Stooge", "Stooge Sort", "Stooge sort", "", SortAxis::Comparison),
    )
}

fn gnome(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("Gnome", "Gnome Sort", "Gnome sort", "Exchange Sorts", SortAxis::Comparison),
    )
}

fn pigeonhole(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("Pigeonhole", "Pigeonhole Sort", "Pigeonhole sort", "Distribution Sorts", SortAxis::Distribution),
    )
}

fn sloppy_bogo(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("Bozo", "Bozo Sort", "Bozosort", "Impractical Sorts", SortAxis::Distribution).with_bogo(),
    )
}

fn disabled(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("Slow", "Slow Sort", "Slowsort", "Impractical Sorts", SortAxis::Comparison).disabled(),
    )
}

fn unnamed(ctx: ContextHandle) -> ConstructResult {
    profiled(
        ctx,
        SortProfile::new("", "Nameless Sort", "Nameless sort", "Misc", SortAxis::Comparison),
    )
}

fn erroring(_ctx: ContextHandle) -> ConstructResult {
    Err("array visualizer not ready".into())
}

fn panicking(_ctx: ContextHandle) -> ConstructResult {
    panic!("constructor blew up")
}

fn register_stooge(ns: &mut Namespace) -> Result<()> {
    ns.register("sorts.custom.StoogeSort", stooge)
}

fn register_uncategorized(ns: &mut Namespace) -> Result<()> {
    ns.register("sorts.custom.StoogeSort", uncategorized_stooge)
}

fn register_other(ns: &mut Namespace) -> Result<()> {
    ns.register("sorts.custom.SomethingElse", stooge)
}

fn register_plugin(ns: &mut Namespace) -> Result<()> {
    ns.register("sorts.plugin.PigeonholeSort", pigeonhole)?;
    ns.register_nested("sorts.plugin.PigeonholeSort", "Hole", None)?;
    ns.register("vendor.plugin.Outside", gnome)
}

fn mixed_namespace() -> Namespace {
    let mut ns = Namespace::builtin();
    ns.register("sorts.exchange.GnomeSort", gnome).unwrap();
    ns.register("sorts.distribute.PigeonholeSort", pigeonhole).unwrap();
    ns.register("sorts.impractical.BozoSort", sloppy_bogo).unwrap();
    ns.register("sorts.impractical.SlowSort", disabled).unwrap();
    ns.register("sorts.misc.Nameless", unnamed).unwrap();
    ns.register("sorts.misc.Erroring", erroring).unwrap();
    ns.register("sorts.misc.Panicking", panicking).unwrap();
    ns.register("sorts.templates.BaseSort", stooge).unwrap();
    ns.register("helpers.Shuffle", stooge).unwrap();
    ns
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_empty_namespace_yields_nothing() {
    let mut fx = Fixture::new(Namespace::builtin(), None);
    let stats = fx.catalog.scan_and_register_all().unwrap();

    assert_eq!(stats.candidates, 0);
    assert!(fx.catalog.comparison_summaries().is_empty());
    assert!(fx.catalog.distribution_summaries().is_empty());
    assert_eq!(fx.catalog.diagnostics(), None);
    assert_eq!(fx.catalog.suggestions(), None);
}

#[test]
fn test_discovery_classifies_and_rejects() {
    let mut fx = Fixture::new(mixed_namespace(), None);
    fx.catalog.scan_and_register_all().unwrap();

    let comparison = fx.catalog.comparison_summaries();
    let distribution = fx.catalog.distribution_summaries();
    assert_eq!(comparison.len(), 1);
    assert_eq!(comparison[0].list_name, "Gnome");
    assert!(comparison.iter().all(|s| s.uses_comparisons));
    assert_eq!(distribution.len(), 2);
    assert!(distribution.iter().all(|s| !s.uses_comparisons));

    let diagnostics = fx.catalog.diagnostics().unwrap();
    assert_eq!(
        diagnostics,
        vec![
            "sorts.impractical.SlowSort (manually disabled)",
            "sorts.misc.Erroring (failed to compile)",
            "sorts.misc.Nameless (missing 'Choose Sort' name)",
            "sorts.misc.Panicking (failed to compile)",
        ]
    );

    let rejected = ["SlowSort", "Erroring", "Nameless", "Panicking"];
    for summary in comparison.iter().chain(distribution.iter()) {
        assert!(!rejected.contains(&summary.sort_type.simple_name()));
    }

    let errors: Vec<_> = fx
        .recorder
        .events()
        .into_iter()
        .filter(|e| e.starts_with("error: Could not compile"))
        .collect();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_templates_and_foreign_namespaces_are_skipped() {
    let mut fx = Fixture::new(mixed_namespace(), None);
    fx.catalog.scan_and_register_all().unwrap();

    let all: Vec<_> = fx
        .catalog
        .comparison_summaries()
        .into_iter()
        .chain(fx.catalog.distribution_summaries())
        .map(|s| s.sort_type.to_string())
        .collect();
    assert!(!all.iter().any(|n| n.starts_with("sorts.templates")));
    assert!(!all.iter().any(|n| n.starts_with("helpers")));
}

#[test]
fn test_suggestions_recorded_for_accepted_sorts_only() {
    let mut fx = Fixture::new(mixed_namespace(), None);
    fx.catalog.scan_and_register_all().unwrap();

    let suggestions = fx.catalog.suggestions().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].lines().count(), 1);
    assert!(suggestions[0].starts_with("- "));
    assert!(suggestions[0].contains("Bozosort"));
}

#[test]
fn test_rescan_is_stable() {
    let mut fx = Fixture::new(mixed_namespace(), Some(register_plugin));
    fx.plugin("pigeon");
    fx.catalog.scan_and_register_all().unwrap();
    let first = fx.catalog.report();

    fx.catalog.scan_and_register_all().unwrap();
    let second = fx.catalog.report();

    assert_eq!(first.comparison, second.comparison);
    assert_eq!(first.distribution, second.distribution);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.suggestions, second.suggestions);
}

#[test]
fn test_plugin_libraries_are_discovered() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_plugin));
    fx.plugin("pigeon");
    fs::write(fx.dir.path().join("plugins/README.md"), "not a library").unwrap();

    let stats = fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(stats.modules, 1);
    assert_eq!(stats.accepted, 1);

    let distribution = fx.catalog.distribution_summaries();
    assert_eq!(distribution.len(), 1);
    assert_eq!(distribution[0].sort_type.as_str(), "sorts.plugin.PigeonholeSort");
    assert!(fx.catalog.comparison_summaries().is_empty());
}

#[test]
fn test_unloadable_plugin_is_diagnosed() {
    let mut fx = Fixture::new(Namespace::builtin(), None);
    let library = fx.plugin("broken");

    let stats = fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(stats.modules, 0);
    assert_eq!(
        fx.catalog.diagnostics(),
        Some(vec![format!("{} (failed to load)", library.display())])
    );
}

#[test]
fn test_plugin_that_loads_on_rescan_clears_its_diagnostic() {
    let loader = FlakyLoader {
        loads: Cell::new(0),
        register: register_plugin,
    };
    let mut fx = Fixture::with_loader(Namespace::builtin(), Box::new(loader), 0);
    fx.plugin("pigeon");

    fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(fx.catalog.diagnostics().map(|d| d.len()), Some(1));
    assert!(fx.catalog.distribution_summaries().is_empty());

    fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(fx.catalog.diagnostics(), None);
    let names: Vec<_> = fx
        .catalog
        .distribution_summaries()
        .into_iter()
        .map(|s| s.sort_type.to_string())
        .collect();
    assert_eq!(names, vec!["sorts.plugin.PigeonholeSort"]);
}

#[test]
fn test_removed_plugin_disappears_on_rescan() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_plugin));
    let library = fx.plugin("pigeon");
    fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(fx.catalog.distribution_summaries().len(), 1);

    fs::remove_file(&library).unwrap();
    let stats = fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(stats.modules, 0);
    assert!(fx.catalog.distribution_summaries().is_empty());
    assert_eq!(fx.catalog.diagnostics(), None);
}

#[test]
fn test_imports_survive_rescan() {
    let mut fx = Fixture::new(mixed_namespace(), Some(register_stooge));
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\n");
    fx.catalog.import_single(&path, true).unwrap();

    fx.catalog.scan_and_register_all().unwrap();
    fx.catalog.scan_and_register_all().unwrap();

    let names: Vec<_> = fx
        .catalog
        .comparison_summaries()
        .into_iter()
        .map(|s| s.list_name)
        .collect();
    assert_eq!(names, vec!["Gnome", "Stooge"]);
}

#[test]
fn test_cache_directory_is_not_a_plugin_dir() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_plugin));
    let cache = fx.dir.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(
        cache.join(format!(
            "{}stale{}",
            std::env::consts::DLL_PREFIX,
            std::env::consts::DLL_SUFFIX
        )),
        b"",
    )
    .unwrap();

    let mut config = CatalogConfig::default();
    config.namespace.cache_dir = cache.clone();
    config.namespace.plugin_dirs = vec![fx.dir.path().to_path_buf()];
    let bridge = Bridge::new(
        cache,
        Box::new(TouchCompiler {
            code: 0,
            calls: fx.compiles.clone(),
        }),
        Box::new(FakeLoader {
            register: Some(register_plugin),
        }),
    );
    fx.catalog = Catalog::new(&config, Namespace::builtin()).with_bridge(bridge);

    let stats = fx.catalog.scan_and_register_all().unwrap();
    assert_eq!(stats.modules, 0);
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_import_comparison_sort() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_stooge));
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\n\npub struct StoogeSort;\n");

    let name = fx.catalog.import_single(&path, true).unwrap();
    assert_eq!(name.as_str(), "sorts.custom.StoogeSort");
    assert_eq!(*fx.compiles.borrow(), 1);

    let names: Vec<_> = fx
        .catalog
        .comparison_summaries()
        .into_iter()
        .map(|s| s.list_name)
        .collect();
    assert_eq!(names, vec!["Stooge"]);
    assert_eq!(
        fx.recorder.events(),
        vec!["changed", "Successfully imported sort sorts.custom.StoogeSort"]
    );
}

#[test]
fn test_batch_import_stays_quiet() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_stooge));
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\n");

    fx.catalog.import_single(&path, false).unwrap();
    assert!(fx.recorder.events().is_empty());
    assert_eq!(fx.catalog.comparison_summaries().len(), 1);
}

#[test]
fn test_reimport_replaces_previous_entry() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_stooge));
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\n");

    fx.catalog.import_single(&path, true).unwrap();
    fs::write(&path, "package sorts.custom;\n// tweaked\n").unwrap();
    fx.catalog.import_single(&path, true).unwrap();

    assert_eq!(*fx.compiles.borrow(), 2);
    assert_eq!(fx.catalog.comparison_summaries().len(), 1);
}

#[test]
fn test_import_without_package_never_compiles() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_stooge));
    let path = fx.source("StoogeSort.rs", "pub struct StoogeSort;\n");

    let err = fx.catalog.import_single(&path, true).unwrap_err();
    assert!(matches!(err, CatalogError::NoPackage { .. }));
    assert_eq!(*fx.compiles.borrow(), 0);
    assert!(fx.catalog.comparison_summaries().is_empty());
    assert_eq!(fx.recorder.events().len(), 1);
    assert!(fx.recorder.events()[0].starts_with("error: Sort Import: No package specified"));
}

#[test]
fn test_import_missing_category_is_rejected() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_uncategorized));
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\n");

    let err = fx.catalog.import_single(&path, true).unwrap_err();
    assert_eq!(err.to_string(), "sorts.custom.StoogeSort (missing category)");
    assert_eq!(
        fx.catalog.diagnostics(),
        Some(vec!["sorts.custom.StoogeSort (missing category)".to_string()])
    );
    assert!(fx.catalog.comparison_summaries().is_empty());
    assert!(!fx.recorder.events().iter().any(|e| e == "changed"));
}

#[test]
fn test_import_compile_failure() {
    let mut fx = Fixture::with_compiler(Namespace::builtin(), Some(register_stooge), 101);
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\nnot rust\n");

    match fx.catalog.import_single(&path, true).unwrap_err() {
        CatalogError::CompileFailed { path: failed, code } => {
            assert_eq!(failed, path);
            assert_eq!(code, 101);
        }
        other => panic!("Expected CompileFailed, got {:?}", other),
    }
    let events = fx.recorder.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("Error code 101"));
}

#[test]
fn test_import_of_missing_type() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_other));
    let path = fx.source("StoogeSort.rs", "package sorts.custom;\n");

    let err = fx.catalog.import_single(&path, true).unwrap_err();
    assert!(matches!(err, CatalogError::CandidateNotFound(ref n) if n == "sorts.custom.StoogeSort"));
    assert!(fx.catalog.comparison_summaries().is_empty());
}

#[test]
fn test_import_missing_file() {
    let mut fx = Fixture::new(Namespace::builtin(), Some(register_stooge));
    let path = fx.dir.path().join("Nope.rs");

    let err = fx.catalog.import_single(&path, true).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
    assert_eq!(*fx.compiles.borrow(), 0);
}

// =============================================================================
// Ordering
// =============================================================================

#[rstest]
#[case(OrderingStrategy::CategoryThenName)]
#[case(OrderingStrategy::ListName)]
#[case(OrderingStrategy::TypeName)]
fn test_reorder_is_idempotent(#[case] strategy: OrderingStrategy) {
    let fx = Fixture::new(mixed_namespace(), None);
    let mut catalog = fx.catalog.with_ordering(strategy.into_ordering());
    catalog.scan_and_register_all().unwrap();

    let comparison = catalog.comparison_summaries();
    let distribution = catalog.distribution_summaries();
    catalog.reorder();
    catalog.reorder();
    assert_eq!(catalog.comparison_summaries(), comparison);
    assert_eq!(catalog.distribution_summaries(), distribution);
}

#[test]
fn test_default_ordering_groups_by_category() {
    let mut fx = Fixture::new(mixed_namespace(), None);
    fx.catalog.scan_and_register_all().unwrap();

    let categories: Vec<_> = fx
        .catalog
        .distribution_summaries()
        .into_iter()
        .map(|s| s.category)
        .collect();
    assert_eq!(categories, vec!["Distribution Sorts", "Impractical Sorts"]);
}
