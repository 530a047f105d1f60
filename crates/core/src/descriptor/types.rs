//! Types for decoded torrent descriptors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when decoding a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Failed to parse torrent: {0}")]
    ParseError(String),

    #[error("Torrent declares neither a file list nor a length")]
    MissingFiles,

    #[error("Unsafe path in torrent: {0}")]
    UnsafePath(String),
}

/// Whether a torrent describes one file or a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentLayout {
    SingleFile,
    MultiFile,
}

/// A file the torrent claims to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredFile {
    /// Path relative to the torrent's content root. For single-file
    /// torrents this is just the torrent name.
    pub path: Vec<String>,
    pub length: u64,
}

impl DeclaredFile {
    pub fn new<S: Into<String>>(path: impl IntoIterator<Item = S>, length: u64) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            length,
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }
}

/// A decoded torrent.
#[derive(Debug, Clone)]
pub struct TorrentDescriptor {
    /// Torrent name (root folder for multi-file, file name for single-file).
    pub name: String,
    /// Lowercase hex info-hash.
    pub info_hash: String,
    pub layout: TorrentLayout,
    /// Declared files in torrent order.
    pub files: Vec<DeclaredFile>,
}

impl TorrentDescriptor {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.length).sum()
    }
}
