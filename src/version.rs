//! Catalog ABI versioning
//!
//! Loaded modules declare the catalog version they were compiled against. A
//! module is only accepted when that version is semver-compatible with the
//! running catalog.

use semver::Version;
use std::fmt;

/// Version of the catalog this crate was built as
pub const CATALOG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A catalog version as declared by the host or by a module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CatalogVersion {
    pub version: Version,
}

impl CatalogVersion {
    pub fn new(version: Version) -> Self {
        Self { version }
    }

    /// The version of the running catalog
    pub fn current() -> Self {
        // CARGO_PKG_VERSION is always valid semver
        Self::parse(CATALOG_VERSION).unwrap_or_else(|_| Self::new(Version::new(0, 0, 0)))
    }

    /// Create from a version string
    pub fn parse(version_str: &str) -> Result<Self, semver::Error> {
        // Strip leading 'v' if present
        let version_str = version_str.strip_prefix('v').unwrap_or(version_str);
        let version = Version::parse(version_str)?;
        Ok(Self::new(version))
    }

    /// Get the version string (e.g., "1.2.3")
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Whether a module built against `self` can be loaded by `host`.
    ///
    /// Same major version, and for 0.x the same minor version as well.
    pub fn is_compatible_with(&self, host: &CatalogVersion) -> bool {
        if self.version.major != host.version.major {
            return false;
        }
        if host.version.major == 0 {
            return self.version.minor == host.version.minor;
        }
        true
    }
}

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version)
    }
}
