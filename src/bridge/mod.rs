//! Compilation & Isolated Loading Bridge
//!
//! Turns a single user-supplied source file into a module namespace:
//!
//! 1. Read the file and find its `package a.b.c;` header
//! 2. Derive the candidate name `<package>.<file base name>`
//! 3. Stage the source into the cache directory with the header commented out
//! 4. Run the external compiler with the cache directory as output
//! 5. Load the artifact through a loader scoped to the cache directory
//!
//! Nothing from a loaded module is ever registered into the main program's
//! namespace.

pub mod compiler;
pub mod loader;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::checksum::SourceDigest;
use crate::error::{CatalogError, Result};
use crate::namespace::{Namespace, QualifiedName};

pub use compiler::{CompileRequest, CompileStatus, Compiler, RustcCompiler};
pub use loader::{DylibLoader, LoadedLibrary, ModuleDeclaration, ModuleLoader};

/// Subdirectory of the cache holding staged sources
const STAGING_DIR: &str = "src";

fn package_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^([ \t]*)package ([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*);")
            .expect("package header pattern is valid")
    })
}

/// The package declared by the first `package ...;` header line, if any
pub fn declared_package(contents: &str) -> Option<&str> {
    package_pattern()
        .captures(contents)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// File name up to the first '.'
pub fn base_name(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
}

/// A source file ready to be compiled
#[derive(Debug, Clone)]
pub struct ImportTarget {
    /// The file the user picked
    pub path: PathBuf,
    /// Fully-qualified candidate name
    pub name: QualifiedName,
    pub contents: String,
}

impl ImportTarget {
    /// Read `path` and derive the candidate name from its package header
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let package = declared_package(&contents).ok_or_else(|| CatalogError::NoPackage {
            path: path.to_path_buf(),
        })?;
        let base = base_name(path)
            .ok_or_else(|| CatalogError::InvalidName(path.display().to_string()))?;
        let name = QualifiedName::join(package, base)?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            contents,
        })
    }

    /// Source handed to the compiler: the header line becomes a comment.
    /// Line numbers are unchanged.
    pub fn staged_source(&self) -> String {
        package_pattern()
            .replacen(&self.contents, 1, |caps: &regex::Captures| {
                format!("{}// package {};", &caps[1], &caps[2])
            })
            .into_owned()
    }

    /// Crate name for the compiled artifact: the dotted name plus a digest prefix
    pub fn crate_name(&self, digest: &SourceDigest) -> String {
        format!(
            "{}_{}",
            self.name.as_str().replace('.', "_").to_lowercase(),
            digest.short(12)
        )
    }
}

/// Compiles and loads single sort sources in isolation
pub struct Bridge {
    cache_dir: PathBuf,
    compiler: Box<dyn Compiler>,
    loader: Box<dyn ModuleLoader>,
}

impl Bridge {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        compiler: Box<dyn Compiler>,
        loader: Box<dyn ModuleLoader>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            compiler,
            loader,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create the cache directory if needed
    pub fn ensure_cache(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }

    /// Stage and compile `target`, returning the artifact path
    pub fn compile(&self, target: &ImportTarget) -> Result<PathBuf> {
        self.ensure_cache()?;

        let staged = target.staged_source();
        let digest = SourceDigest::of_source(&staged);

        let mut staged_path = self.cache_dir.join(STAGING_DIR);
        for segment in target.name.package().split('.').filter(|s| !s.is_empty()) {
            staged_path.push(segment);
        }
        fs::create_dir_all(&staged_path)?;
        staged_path.push(format!("{}.rs", target.name.simple_name()));
        fs::write(&staged_path, &staged)?;

        let request = CompileRequest {
            source: staged_path,
            out_dir: self.cache_dir.clone(),
            crate_name: target.crate_name(&digest),
        };
        info!(name = %target.name, source = %target.path.display(), %digest, "compiling sort");

        let status = self.compiler.compile(&request);
        if !status.is_success() {
            return Err(CatalogError::CompileFailed {
                path: target.path.clone(),
                code: status.code,
            });
        }

        debug!(artifact = %request.artifact_path().display(), "compiled sort");
        Ok(request.artifact_path())
    }

    /// Load an artifact through a loader scoped to the cache directory
    pub fn load(&self, artifact: &Path) -> Result<Namespace> {
        self.loader.load(&self.cache_dir, artifact)
    }

    /// Load a prebuilt module through a loader scoped to its own directory
    pub fn load_prebuilt(&self, library: &Path) -> Result<Namespace> {
        let scope = library.parent().unwrap_or_else(|| Path::new("."));
        self.loader.load(scope, library)
    }

    /// Read, compile and load `path`
    pub fn build(&self, path: &Path) -> Result<(ImportTarget, Namespace)> {
        let target = ImportTarget::read(path)?;
        let artifact = self.compile(&target)?;
        let namespace = self.load(&artifact)?;
        Ok((target, namespace))
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}
