//! Error types for the sort catalog

use std::path::PathBuf;

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Sort catalog errors
///
/// Per-candidate problems (missing types, failed constructors, validation
/// rejections) are normally recorded as diagnostics and never surface here.
/// Only import-scoped and scan-scoped failures propagate to the caller.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No package specified in {path}")]
    NoPackage { path: PathBuf },

    #[error("Invalid type name: {0}")]
    InvalidName(String),

    #[error("Failed to compile: {path}\nError code {code}")]
    CompileFailed { path: PathBuf, code: i32 },

    #[error("Failed to load module {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Module {path} was built against catalog {found}, expected a version compatible with {expected}")]
    IncompatibleModule {
        path: PathBuf,
        found: String,
        expected: String,
    },

    #[error("Refusing to load {path}: outside of loader scope {scope}")]
    OutsideScope { path: PathBuf, scope: PathBuf },

    #[error("Module panicked: {0}")]
    ModulePanic(String),

    #[error("Sort type not found: {0}")]
    CandidateNotFound(String),

    #[error("Could not construct {name}: {detail}")]
    Instantiation { name: String, detail: String },

    #[error("{name} ({reason})")]
    Rejected { name: String, reason: String },

    #[error("Sort discovery failed: {0}")]
    Scan(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl From<walkdir::Error> for CatalogError {
    fn from(err: walkdir::Error) -> Self {
        CatalogError::Scan(err.to_string())
    }
}
