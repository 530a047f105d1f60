//! Recursive directory walk used by index rebuilds.

use regex_lite::Regex;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use super::error::IndexError;

/// A regular file found below a scan root.
#[derive(Debug, Clone)]
pub(crate) struct ScannedFile {
    pub path: PathBuf,
    /// Path components relative to the scan root.
    pub segments: Vec<String>,
    pub size: u64,
}

/// Compiles ignore patterns.
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, IndexError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| IndexError::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn is_ignored(name: &str, ignore: &[Regex]) -> bool {
    ignore.iter().any(|re| re.is_match(name))
}

/// Walks `root` and returns every regular file below it in file-name order.
///
/// Symlinks are not followed and not indexed. Entries whose name matches an
/// ignore pattern are skipped (for directories, with their whole subtree).
/// Permission errors below the root are logged and skipped; any other error
/// aborts the scan.
pub(crate) fn scan_root(root: &Path, ignore: &[Regex]) -> Result<Vec<ScannedFile>, IndexError> {
    let metadata = std::fs::metadata(root).map_err(|e| IndexError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(IndexError::RootUnreadable {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(&e.file_name().to_string_lossy(), ignore));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                let depth = err.depth();
                let source: io::Error = err.into();
                if depth == 0 {
                    return Err(IndexError::RootUnreadable { path, source });
                }
                if source.kind() == io::ErrorKind::PermissionDenied {
                    warn!(path = %path.display(), "Skipping unreadable entry: {}", source);
                    continue;
                }
                return Err(IndexError::Scan { path, source });
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| IndexError::Scan {
                path: entry.path().to_path_buf(),
                source: e.into(),
            })?
            .len();

        let segments = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        files.push(ScannedFile {
            path: entry.into_path(),
            segments,
            size,
        });
    }

    Ok(files)
}
