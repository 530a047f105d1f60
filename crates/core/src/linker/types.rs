//! Types for the linker module.

use serde::{Deserialize, Serialize};

/// How matched files are materialized in the destination folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Symbolic link pointing at the absolute source path.
    #[default]
    Soft,
    /// Hard link; source and destination must share a filesystem.
    Hard,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Soft => "soft",
            LinkType::Hard => "hard",
        }
    }
}

/// Outcome of a link pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    /// Files linked into the destination.
    pub linked: usize,
    /// Incomplete entries left absent.
    pub skipped: usize,
}
