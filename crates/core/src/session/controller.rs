//! Session controller implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::seeded::SeededSet;
use super::types::{BatchEntry, MatchReport, SessionOutcome, SessionSettings, Status};
use crate::descriptor::{decode, TorrentDescriptor};
use crate::index::ContentIndex;
use crate::linker::FsLinker;
use crate::matcher::{MatchMode, MatchResult, Matcher};
use crate::torrent_client::{AddTorrentRequest, TorrentClient, TorrentClientError};

/// Drives descriptors through decode, match, link and registration.
///
/// Descriptors are handled one at a time. The seeded set is only updated by
/// `refresh_seeded`, never as a side effect of handling a torrent.
pub struct SessionController {
    index: ContentIndex,
    torrent_client: Arc<dyn TorrentClient>,
    seeded: SeededSet,
    settings: SessionSettings,
    linker: FsLinker,
}

impl SessionController {
    /// Create a session with an empty seeded set.
    pub fn new(
        index: ContentIndex,
        torrent_client: Arc<dyn TorrentClient>,
        settings: SessionSettings,
    ) -> Self {
        let linker = FsLinker::new(settings.link_type);
        Self {
            index,
            torrent_client,
            seeded: SeededSet::new(),
            settings,
            linker,
        }
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    pub fn seeded(&self) -> &SeededSet {
        &self.seeded
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Reloads the seeded set from the client. Returns the number of hashes.
    pub async fn refresh_seeded(&mut self) -> Result<usize, SessionError> {
        let hashes = self.torrent_client.list_info_hashes().await?;
        self.seeded.replace(&hashes);
        info!(
            client = self.torrent_client.name(),
            count = self.seeded.len(),
            "Refreshed seeded torrents"
        );
        Ok(self.seeded.len())
    }

    /// Decodes and matches a descriptor without touching disk or client.
    pub fn inspect(&self, bytes: &[u8]) -> Result<MatchReport, SessionError> {
        inspect_descriptor(&self.index, &self.settings, bytes)
    }

    /// Reads a descriptor file and handles it.
    pub async fn handle_descriptor_file(&self, path: &Path) -> Result<SessionOutcome, SessionError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SessionError::ReadDescriptor {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.handle_descriptor(&bytes, Some(path)).await
    }

    /// Handles one descriptor.
    ///
    /// `source` is the file the bytes came from; it is removed after a
    /// successful add when `delete_original_after_add` is set.
    pub async fn handle_descriptor(
        &self,
        bytes: &[u8],
        source: Option<&Path>,
    ) -> Result<SessionOutcome, SessionError> {
        let started = Instant::now();
        let descriptor = decode(bytes)?;
        let destination = destination_for(&self.settings, &descriptor);

        let outcome = |status: Status, destination: PathBuf| SessionOutcome {
            status,
            info_hash: descriptor.info_hash.clone(),
            name: descriptor.name.clone(),
            destination,
            found_size: 0,
            missing_size: 0,
            mode: None,
        };

        if self.seeded.contains(&descriptor.info_hash) {
            debug!(info_hash = %descriptor.info_hash, "Torrent already seeding");
            return Ok(outcome(Status::AlreadySeeding, destination));
        }

        if tokio::fs::symlink_metadata(&destination).await.is_ok() {
            debug!(
                info_hash = %descriptor.info_hash,
                path = %destination.display(),
                "Destination exists but torrent is not seeding"
            );
            return Ok(outcome(Status::FolderExistNotSeeding, destination));
        }

        let result = match_descriptor(&self.index, &self.settings, &descriptor);
        let found_size = result.found_size();
        let missing_size = result.missing_size();

        if !self
            .settings
            .within_tolerance(missing_size, result.total_size())
        {
            info!(
                info_hash = %descriptor.info_hash,
                found_size,
                missing_size,
                "Too much content missing"
            );
            return Ok(SessionOutcome {
                found_size,
                missing_size,
                mode: Some(result.mode),
                ..outcome(Status::MissingFiles, destination)
            });
        }

        let content_root = match &result.mode {
            MatchMode::Exact { root } => root.clone(),
            MatchMode::Link => {
                self.linker.link(&destination, &result).await?;
                destination
            }
        };

        let request = AddTorrentRequest {
            data: bytes.to_vec(),
            info_hash: descriptor.info_hash.clone(),
            name: descriptor.name.clone(),
            destination: content_root.clone(),
            files: result.files,
        };
        if !self.torrent_client.add_torrent(request).await? {
            return Err(TorrentClientError::Rejected(format!(
                "{} refused torrent {}",
                self.torrent_client.name(),
                descriptor.info_hash
            ))
            .into());
        }

        if self.settings.policy.delete_original_after_add {
            if let Some(path) = source {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    warn!(path = %path.display(), "Failed to delete original descriptor: {}", e);
                }
            }
        }

        info!(
            info_hash = %descriptor.info_hash,
            name = %descriptor.name,
            mode = result.mode.as_str(),
            path = %content_root.display(),
            found_size,
            missing_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Torrent added"
        );

        Ok(SessionOutcome {
            found_size,
            missing_size,
            mode: Some(result.mode),
            ..outcome(Status::Ok, content_root)
        })
    }

    /// Handles descriptor files in order. A failing entry never stops the
    /// remaining ones.
    pub async fn handle_batch(&self, paths: &[PathBuf]) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.handle_descriptor_file(path).await;
            if let Err(e) = &result {
                warn!(path = %path.display(), "Failed to handle torrent: {}", e);
            }
            entries.push(BatchEntry {
                path: path.clone(),
                result,
            });
        }
        entries
    }
}

/// Builds the match report for a descriptor against `index`.
///
/// Needs no client, so dry runs work without a `[torrent_client]` section.
pub fn inspect_descriptor(
    index: &ContentIndex,
    settings: &SessionSettings,
    bytes: &[u8],
) -> Result<MatchReport, SessionError> {
    let descriptor = decode(bytes)?;
    let result = match_descriptor(index, settings, &descriptor);
    let destination = match &result.mode {
        MatchMode::Exact { root } => root.clone(),
        MatchMode::Link => destination_for(settings, &descriptor),
    };
    let found_size = result.found_size();
    let missing_size = result.missing_size();

    Ok(MatchReport {
        within_tolerance: settings.within_tolerance(missing_size, result.total_size()),
        info_hash: descriptor.info_hash,
        name: descriptor.name,
        layout: descriptor.layout,
        destination,
        mode: result.mode,
        files: result.files,
        found_size,
        missing_size,
    })
}

fn match_descriptor(
    index: &ContentIndex,
    settings: &SessionSettings,
    descriptor: &TorrentDescriptor,
) -> MatchResult {
    Matcher::new(index, settings.exact_mode).match_descriptor(descriptor)
}

/// `store_path/<torrent name>` with separators replaced.
fn destination_for(settings: &SessionSettings, descriptor: &TorrentDescriptor) -> PathBuf {
    settings
        .store_path
        .join(folder_name(&descriptor.name, &descriptor.info_hash))
}

fn folder_name(name: &str, info_hash: &str) -> String {
    match name {
        "" | "." | ".." => info_hash.to_string(),
        _ => name.replace(['/', '\\'], "_"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::index::NormalizeRules;
    use crate::linker::LinkType;
    use crate::testing::{fixtures, MockTorrentClient};
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        client: Arc<MockTorrentClient>,
        session: SessionController,
    }

    fn harness(policy: PolicyConfig) -> Harness {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fixtures::create_file(&src, &["file_a.txt"], 11).unwrap();
        fixtures::create_file(&src, &["file_b.txt"], 11).unwrap();

        let mut index = ContentIndex::new(NormalizeRules::default(), &[], false).unwrap();
        index.rebuild(&[src]).unwrap();

        let client = Arc::new(MockTorrentClient::new());
        let settings = SessionSettings {
            store_path: dir.path().join("store"),
            link_type: LinkType::Soft,
            exact_mode: false,
            policy,
        };
        let session = SessionController::new(index, client.clone(), settings);
        Harness {
            dir,
            client,
            session,
        }
    }

    fn abc_torrent() -> Vec<u8> {
        fixtures::torrent_bytes(
            "test",
            &[(&["file_a.txt"], 11), (&["file_b.txt"], 11), (&["file_c.txt"], 11)],
        )
        .unwrap()
    }

    #[test]
    fn test_folder_name() {
        assert_eq!(folder_name("Release", "abc"), "Release");
        assert_eq!(folder_name("a/b\\c", "abc"), "a_b_c");
        assert_eq!(folder_name("..", "abc"), "abc");
        assert_eq!(folder_name("", "abc"), "abc");
    }

    #[tokio::test]
    async fn test_missing_files_has_no_side_effects() {
        let h = harness(PolicyConfig::default());

        let outcome = h.session.handle_descriptor(&abc_torrent(), None).await.unwrap();
        assert_eq!(outcome.status, Status::MissingFiles);
        assert_eq!(outcome.found_size, 22);
        assert_eq!(outcome.missing_size, 11);
        assert!(!h.dir.path().join("store").exists());
        assert!(h.client.added_torrents().await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_match_within_tolerance_links_present_files() {
        let h = harness(PolicyConfig {
            add_limit_size: 11,
            ..Default::default()
        });

        let outcome = h.session.handle_descriptor(&abc_torrent(), None).await.unwrap();
        assert_eq!(outcome.status, Status::Ok);
        assert_eq!(outcome.mode, Some(MatchMode::Link));

        let dest = h.dir.path().join("store").join("test");
        assert_eq!(outcome.destination, dest);
        assert!(dest.join("file_a.txt").exists());
        assert!(dest.join("file_b.txt").exists());
        assert!(!dest.join("file_c.txt").exists());

        let added = h.client.added_torrents().await;
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].request.destination, dest);
        assert_eq!(added[0].request.completed_files(), 2);
    }

    #[tokio::test]
    async fn test_inspect_has_no_side_effects() {
        let h = harness(PolicyConfig::default());

        let report = h.session.inspect(&abc_torrent()).unwrap();
        assert_eq!(report.found_size, 22);
        assert_eq!(report.missing_size, 11);
        assert!(!report.within_tolerance);
        assert_eq!(report.destination, h.dir.path().join("store").join("test"));
        assert!(!h.dir.path().join("store").exists());
        assert!(h.client.added_torrents().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_add_is_an_error() {
        let h = harness(PolicyConfig {
            add_limit_percent: 50.0,
            ..Default::default()
        });
        h.client.set_reject_adds(true).await;

        let err = h
            .session
            .handle_descriptor(&abc_torrent(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::TorrentClient(TorrentClientError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_decode_error_is_reported() {
        let h = harness(PolicyConfig::default());
        let err = h
            .session
            .handle_descriptor(b"garbage", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Descriptor(_)));
    }

    #[tokio::test]
    async fn test_unreadable_descriptor_file() {
        let h = harness(PolicyConfig::default());
        let err = h
            .session
            .handle_descriptor_file(&h.dir.path().join("missing.torrent"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ReadDescriptor { .. }));
    }
}
