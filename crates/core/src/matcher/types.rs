//! Types for the matcher module.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::descriptor::DeclaredFile;

/// Resolution of one declared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
    pub path: Vec<String>,
    pub length: u64,
    /// True iff a local file was resolved.
    pub completed: bool,
    pub actual_path: Option<PathBuf>,
}

impl FileMatch {
    pub fn new(declared: &DeclaredFile, actual_path: Option<PathBuf>) -> Self {
        Self {
            path: declared.path.clone(),
            length: declared.length,
            completed: actual_path.is_some(),
            actual_path,
        }
    }
}

/// How the matched content is handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchMode {
    /// Files are linked into a fresh destination folder.
    Link,
    /// The content already sits at `root` with the declared layout.
    Exact { root: PathBuf },
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Link => "link",
            MatchMode::Exact { .. } => "exact",
        }
    }

    /// Root directory of an exact match.
    pub fn exact_root(&self) -> Option<&Path> {
        match self {
            MatchMode::Link => None,
            MatchMode::Exact { root } => Some(root),
        }
    }
}

/// Outcome of matching one torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// One entry per declared file, in declared order.
    pub files: Vec<FileMatch>,
    pub mode: MatchMode,
}

impl MatchResult {
    /// Bytes of declared files that were resolved.
    pub fn found_size(&self) -> u64 {
        self.files
            .iter()
            .filter(|f| f.completed)
            .map(|f| f.length)
            .sum()
    }

    /// Bytes of declared files that were not resolved.
    pub fn missing_size(&self) -> u64 {
        self.files
            .iter()
            .filter(|f| !f.completed)
            .map(|f| f.length)
            .sum()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.length).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.files.iter().all(|f| f.completed)
    }
}
