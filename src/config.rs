//! Configuration management for the sort catalog
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (sort-catalog.toml)
//! - Environment variables (SORT_CATALOG__*)
//!
//! ## Example config file (sort-catalog.toml):
//! ```toml
//! [namespace]
//! root = "sorts"
//! excluded = ["sorts.templates"]
//! cache_dir = "./cache"
//! plugin_dirs = ["plugins"]
//!
//! [compiler]
//! program = "rustc"
//! edition = "2021"
//! args = ["-C", "opt-level=2"]
//! search_paths = ["target/release/deps"]
//! externs = [{ name = "sort_catalog", path = "target/release/libsort_catalog.rlib" }]
//!
//! [ordering]
//! strategy = "category_then_name"
//!
//! [context]
//! max_array_length = 16384
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::contract::VisualContext;
use crate::discovery::ScanFilter;
use crate::error::Result;
use crate::ordering::OrderingStrategy;

/// Main configuration for the sort catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Discovery settings
    #[serde(default)]
    pub namespace: NamespaceConfig,

    /// External compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Display ordering
    #[serde(default)]
    pub ordering: OrderingConfig,

    /// Shared visualization context handed to every sort
    #[serde(default)]
    pub context: VisualContext,
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Namespace every discoverable sort lives under
    #[serde(default = "default_root")]
    pub root: String,

    /// Sub-namespaces holding base and template types
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,

    /// Compilation cache; also excluded from discovery
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directories searched for prebuilt sort modules
    #[serde(default)]
    pub plugin_dirs: Vec<PathBuf>,
}

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Rust edition passed to the compiler
    #[serde(default = "default_edition")]
    pub edition: String,

    /// Extra arguments, inserted before the source path
    #[serde(default)]
    pub args: Vec<String>,

    /// `-L dependency=` search paths
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// `--extern` crates, typically this catalog's own rlib
    #[serde(default)]
    pub externs: Vec<ExternCrate>,
}

/// A crate made available to compiled sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternCrate {
    pub name: String,
    pub path: PathBuf,
}

/// Ordering configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrderingConfig {
    #[serde(default)]
    pub strategy: OrderingStrategy,
}

// Default value functions
fn default_root() -> String {
    "sorts".to_string()
}

fn default_excluded() -> Vec<String> {
    vec!["sorts.templates".to_string()]
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache/")
}

fn default_program() -> String {
    "rustc".to_string()
}

fn default_edition() -> String {
    "2021".to_string()
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            excluded: default_excluded(),
            cache_dir: default_cache_dir(),
            plugin_dirs: Vec::new(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            edition: default_edition(),
            args: Vec::new(),
            search_paths: Vec::new(),
            externs: Vec::new(),
        }
    }
}

impl NamespaceConfig {
    /// Discovery filter: root, excluded namespaces, and the cache directory
    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter {
            root: self.root.clone(),
            excluded_namespaces: self.excluded.clone(),
            excluded_paths: vec![self.cache_dir.clone()],
        }
    }
}

impl CatalogConfig {
    /// Load configuration from the default locations, then `config_path` if given
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "sort-catalog.toml",
            ".sort-catalog.toml",
            "config/sort-catalog.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "sort-catalog") {
            let xdg_config = config_dir.config_dir().join("sort-catalog.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SORT_CATALOG__*)
        builder = builder.add_source(
            Environment::with_prefix("SORT_CATALOG")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
