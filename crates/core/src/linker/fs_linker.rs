//! File system linker implementation.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::error::LinkerError;
use super::types::{LinkSummary, LinkType};
use crate::matcher::{FileMatch, MatchMode, MatchResult};

/// Links matched files into a destination folder.
#[derive(Debug, Clone, Copy)]
pub struct FsLinker {
    link_type: LinkType,
}

impl FsLinker {
    pub fn new(link_type: LinkType) -> Self {
        Self { link_type }
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Materializes `result` below `destination`.
    ///
    /// Every completed entry is linked at `destination/<path segments>`;
    /// incomplete entries are skipped. Exact matches are a no-op. Nothing is
    /// rolled back when a link fails part way through.
    pub async fn link(
        &self,
        destination: &Path,
        result: &MatchResult,
    ) -> Result<LinkSummary, LinkerError> {
        if let MatchMode::Exact { root } = &result.mode {
            debug!(root = %root.display(), "Exact match, nothing to link");
            return Ok(LinkSummary::default());
        }

        fs::create_dir_all(destination)
            .await
            .map_err(|e| LinkerError::DirectoryCreationFailed {
                path: destination.to_path_buf(),
                source: e,
            })?;

        let mut summary = LinkSummary::default();
        for file in &result.files {
            match &file.actual_path {
                Some(actual) if file.completed => {
                    self.link_file(actual, &target_path(destination, file)).await?;
                    summary.linked += 1;
                }
                _ => summary.skipped += 1,
            }
        }

        info!(
            destination = %destination.display(),
            link_type = self.link_type.as_str(),
            linked = summary.linked,
            skipped = summary.skipped,
            "Linked torrent files"
        );
        Ok(summary)
    }

    async fn link_file(&self, source: &Path, target: &Path) -> Result<(), LinkerError> {
        if fs::symlink_metadata(target).await.is_ok() {
            return Err(LinkerError::DestinationExists {
                path: target.to_path_buf(),
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LinkerError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        match self.link_type {
            LinkType::Soft => {
                let absolute =
                    std::path::absolute(source).map_err(|e| LinkerError::SourceResolutionFailed {
                        path: source.to_path_buf(),
                        source: e,
                    })?;
                symlink(&absolute, target)
                    .await
                    .map_err(|e| LinkerError::link_failed(absolute.clone(), target.to_path_buf(), e))?;
            }
            LinkType::Hard => {
                fs::hard_link(source, target).await.map_err(|e| {
                    LinkerError::link_failed(source.to_path_buf(), target.to_path_buf(), e)
                })?;
            }
        }

        debug!(source = %source.display(), target = %target.display(), "Created link");
        Ok(())
    }
}

fn target_path(destination: &Path, file: &FileMatch) -> PathBuf {
    file.path
        .iter()
        .fold(destination.to_path_buf(), |acc, segment| acc.join(segment))
}

#[cfg(unix)]
async fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    fs::symlink(source, target).await
}

#[cfg(windows)]
async fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    fs::symlink_file(source, target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DeclaredFile;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn link_result(files: Vec<FileMatch>) -> MatchResult {
        MatchResult {
            files,
            mode: MatchMode::Link,
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_soft_links_mirror_declared_layout() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src/a.txt");
        write(&source, "hello");
        let destination = dir.path().join("store/Release");

        let result = link_result(vec![FileMatch::new(
            &DeclaredFile::new(["CD1", "a.txt"], 5),
            Some(source.clone()),
        )]);

        let summary = FsLinker::new(LinkType::Soft)
            .link(&destination, &result)
            .await
            .unwrap();
        assert_eq!(summary, LinkSummary { linked: 1, skipped: 0 });

        let target = destination.join("CD1").join("a.txt");
        let meta = std::fs::symlink_metadata(&target).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_hard_links_share_content() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src/a.txt");
        write(&source, "hello");
        let destination = dir.path().join("store/Release");

        let result = link_result(vec![FileMatch::new(
            &DeclaredFile::new(["a.txt"], 5),
            Some(source.clone()),
        )]);

        FsLinker::new(LinkType::Hard)
            .link(&destination, &result)
            .await
            .unwrap();

        let target = destination.join("a.txt");
        let meta = std::fs::symlink_metadata(&target).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_incomplete_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src/a.txt");
        write(&source, "a");
        let destination = dir.path().join("store/Release");

        let result = link_result(vec![
            FileMatch::new(&DeclaredFile::new(["a.txt"], 1), Some(source)),
            FileMatch::new(&DeclaredFile::new(["b.txt"], 1), None),
        ]);

        let summary = FsLinker::new(LinkType::Hard)
            .link(&destination, &result)
            .await
            .unwrap();
        assert_eq!(summary, LinkSummary { linked: 1, skipped: 1 });
        assert!(destination.join("a.txt").exists());
        assert!(!destination.join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_exact_match_is_noop() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("store/Release");
        let result = MatchResult {
            files: vec![FileMatch::new(
                &DeclaredFile::new(["a.txt"], 1),
                Some(dir.path().join("a.txt")),
            )],
            mode: MatchMode::Exact {
                root: dir.path().to_path_buf(),
            },
        };

        let summary = FsLinker::new(LinkType::Soft)
            .link(&destination, &result)
            .await
            .unwrap();
        assert_eq!(summary, LinkSummary::default());
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_existing_target_fails() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src/a.txt");
        write(&source, "a");
        let destination = dir.path().join("store/Release");
        write(&destination.join("a.txt"), "already here");

        let result = link_result(vec![FileMatch::new(
            &DeclaredFile::new(["a.txt"], 1),
            Some(source),
        )]);

        let err = FsLinker::new(LinkType::Hard)
            .link(&destination, &result)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkerError::DestinationExists { .. }));
    }

    #[tokio::test]
    async fn test_missing_source_fails_hard_link() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("store/Release");

        let result = link_result(vec![FileMatch::new(
            &DeclaredFile::new(["a.txt"], 1),
            Some(dir.path().join("gone.txt")),
        )]);

        let err = FsLinker::new(LinkType::Hard)
            .link(&destination, &result)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkerError::LinkFailed { .. }));
    }
}
