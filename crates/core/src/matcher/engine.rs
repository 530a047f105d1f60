//! Match engine.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::{FileMatch, MatchMode, MatchResult};
use crate::descriptor::{DeclaredFile, TorrentDescriptor, TorrentLayout};
use crate::index::{ContentIndex, DirectorySignature, IndexError};

/// Maps declared torrent files onto a `ContentIndex`.
///
/// Lookups never consume index entries: two declared files with the same
/// size and name resolve to the same local file.
pub struct Matcher<'a> {
    index: &'a ContentIndex,
    exact_mode: bool,
}

impl<'a> Matcher<'a> {
    /// `exact_mode` allows `MatchMode::Exact` results.
    pub fn new(index: &'a ContentIndex, exact_mode: bool) -> Self {
        Self { index, exact_mode }
    }

    pub fn match_descriptor(&self, descriptor: &TorrentDescriptor) -> MatchResult {
        self.match_files(&descriptor.files, descriptor.layout)
    }

    /// Resolves `files` and classifies the match.
    ///
    /// A signature-matched directory that can no longer be listed counts as
    /// a signature miss.
    pub fn match_files(&self, files: &[DeclaredFile], layout: TorrentLayout) -> MatchResult {
        if layout == TorrentLayout::MultiFile && self.index.directory_index_enabled() {
            let rules = self.index.rules();
            let signature = DirectorySignature::compute(
                files
                    .iter()
                    .map(|f| (rules.normalize_segments(&f.path), f.length)),
            );
            if let Some(root) = signature
                .as_ref()
                .and_then(|sig| self.index.lookup_directory(sig))
            {
                debug!(root = %root.display(), "Torrent matched a directory signature");
                match self.match_within(root, files) {
                    Ok(result) => return result,
                    Err(e) => warn!(
                        root = %root.display(),
                        "Matched directory is unreadable, resolving files one by one: {}",
                        e
                    ),
                }
            }
        }

        let matches: Vec<FileMatch> = files
            .iter()
            .map(|f| {
                let actual = f
                    .file_name()
                    .and_then(|name| self.index.lookup_file(f.length, name))
                    .map(Path::to_path_buf);
                FileMatch::new(f, actual)
            })
            .collect();

        let mode = match (layout, matches.as_slice()) {
            (TorrentLayout::SingleFile, [only]) if self.exact_mode => single_file_mode(only),
            _ => MatchMode::Link,
        };

        MatchResult {
            files: matches,
            mode,
        }
    }

    /// Resolves every declared file inside `root` by relative path.
    fn match_within(&self, root: &Path, files: &[DeclaredFile]) -> Result<MatchResult, IndexError> {
        let rules = self.index.rules();
        let listing = self.index.list_directory(root)?;

        let mut exact = self.exact_mode;
        let matches: Vec<FileMatch> = files
            .iter()
            .map(|f| {
                let actual = listing
                    .get(&rules.normalize_segments(&f.path))
                    .filter(|(_, size)| *size == f.length)
                    .map(|(path, _)| path.clone());

                let expected: PathBuf = f.path.iter().fold(root.to_path_buf(), |p, s| p.join(s));
                exact &= actual.as_deref() == Some(expected.as_path());
                FileMatch::new(f, actual)
            })
            .collect();

        let mode = if exact {
            MatchMode::Exact {
                root: root.to_path_buf(),
            }
        } else {
            MatchMode::Link
        };

        Ok(MatchResult {
            files: matches,
            mode,
        })
    }
}

/// A single-file torrent is seeded in place when the resolved file carries
/// exactly the declared name.
fn single_file_mode(only: &FileMatch) -> MatchMode {
    let (Some(actual), Some(name)) = (&only.actual_path, only.path.last()) else {
        return MatchMode::Link;
    };
    match actual.parent() {
        Some(parent) if actual.file_name() == Some(OsStr::new(name)) => MatchMode::Exact {
            root: parent.to_path_buf(),
        },
        _ => MatchMode::Link,
    }
}
