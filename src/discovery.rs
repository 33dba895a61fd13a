//! Sort Discovery
//!
//! Enumerates candidate sort names from a namespace and finds prebuilt module
//! libraries in plugin directories. Discovery never instantiates anything.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::namespace::{Namespace, QualifiedName, TypeEntry};

/// Which names and paths discovery considers
#[derive(Debug, Clone)]
pub struct ScanFilter {
    /// Only names under this namespace are candidates
    pub root: String,
    /// Names under these namespaces are skipped (base and template types)
    pub excluded_namespaces: Vec<String>,
    /// Types originating under these paths are skipped (compilation cache)
    pub excluded_paths: Vec<PathBuf>,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            root: "sorts".to_string(),
            excluded_namespaces: vec!["sorts.templates".to_string()],
            excluded_paths: vec![PathBuf::from("cache")],
        }
    }
}

impl ScanFilter {
    /// Whether a namespace entry is a discovery candidate
    pub fn accepts(&self, entry: &TypeEntry) -> bool {
        if entry.is_nested() {
            return false;
        }
        if !entry.name.is_within(&self.root) {
            return false;
        }
        if self
            .excluded_namespaces
            .iter()
            .any(|ns| entry.name.is_within(ns))
        {
            return false;
        }
        match entry.origin.path() {
            Some(path) => !self.is_excluded_path(path),
            None => true,
        }
    }

    /// Whether `path` lies under one of the excluded paths
    pub fn is_excluded_path(&self, path: &Path) -> bool {
        let path = lexical(path);
        let canonical = path.canonicalize().ok();
        self.excluded_paths.iter().any(|excluded| {
            let excluded = lexical(excluded);
            if path.starts_with(&excluded) {
                return true;
            }
            match (&canonical, excluded.canonicalize()) {
                (Some(path), Ok(excluded)) => path.starts_with(excluded),
                _ => false,
            }
        })
    }
}

fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Candidate names visible in `namespace`, in name order
pub fn scan_namespace(namespace: &Namespace, filter: &ScanFilter) -> Vec<QualifiedName> {
    let names: Vec<_> = namespace
        .entries()
        .filter(|entry| filter.accepts(entry))
        .map(|entry| entry.name.clone())
        .collect();
    debug!(
        origin = ?namespace.origin(),
        candidates = names.len(),
        total = namespace.len(),
        "scanned namespace"
    );
    names
}

/// Whether a file name looks like a dynamic library on this platform
pub fn is_module_library(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(DLL_PREFIX) && n.ends_with(DLL_SUFFIX) && n.len() > DLL_PREFIX.len() + DLL_SUFFIX.len())
        .unwrap_or(false)
}

/// Walk plugin directories for prebuilt module libraries.
///
/// Excluded paths are pruned from the walk. Missing directories are skipped;
/// any other walk error aborts discovery.
pub fn find_module_libraries(dirs: &[PathBuf], filter: &ScanFilter) -> Result<Vec<PathBuf>> {
    let mut libraries = Vec::new();

    for dir in dirs {
        if !dir.exists() {
            debug!(dir = %dir.display(), "plugin directory does not exist, skipping");
            continue;
        }

        let walker = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !filter.is_excluded_path(e.path()));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_module_library(entry.path()) {
                libraries.push(entry.into_path());
            }
        }
    }

    libraries.sort();
    libraries.dedup();
    Ok(libraries)
}
