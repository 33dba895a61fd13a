//! Content digests for staged sort sources

use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 digest of a staged source file.
///
/// Cached artifacts carry a prefix of this digest in their file name, so an
/// edited source never maps onto a library the process already has open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceDigest(String);

impl SourceDigest {
    /// Compute digest from source text
    pub fn of_source(content: &str) -> Self {
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{:x}", hash))
    }

    /// First `len` hex characters, used in artifact names
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for SourceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
