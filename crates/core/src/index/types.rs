//! Key types for the content index.

use serde::Serialize;
use sha2::digest::Output;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Flat index key: file size plus normalized file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub size: u64,
    pub name: String,
}

impl IndexKey {
    pub fn new(size: u64, name: impl Into<String>) -> Self {
        Self {
            size,
            name: name.into(),
        }
    }
}

/// Order-independent signature of every file below a directory.
///
/// Built from the sorted multiset of `(normalized relative path, size)` pairs.
/// Equal signatures mean equal names and sizes, not byte-identical content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectorySignature {
    pub total_size: u64,
    pub file_count: u64,
    pub digest: [u8; 32],
}

impl DirectorySignature {
    /// Computes the signature of a set of entries.
    ///
    /// Returns `None` for an empty set; empty directories are never indexed.
    pub fn compute<I, S>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut pairs: Vec<(String, u64)> = entries
            .into_iter()
            .map(|(name, size)| (name.into(), size))
            .collect();
        if pairs.is_empty() {
            return None;
        }
        pairs.sort();

        let mut hasher = Sha256::new();
        let mut total_size = 0u64;
        for (name, size) in &pairs {
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update(size.to_le_bytes());
            total_size = total_size.saturating_add(*size);
        }

        Some(Self {
            total_size,
            file_count: pairs.len() as u64,
            digest: hasher.finalize().into(),
        })
    }

    /// Lowercase hex form of the digest.
    pub fn digest_hex(&self) -> String {
        format!("{:x}", Output::<Sha256>::from(self.digest))
    }
}

impl fmt::Display for DirectorySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_count,
            self.total_size,
            &self.digest_hex()[..16]
        )
    }
}

/// Files found below one directory, keyed by normalized relative path.
pub type DirectoryListing = HashMap<String, (PathBuf, u64)>;

/// Entry counts of an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub directories: usize,
}
