//! Mock torrent client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::torrent_client::{AddTorrentRequest, TorrentClient, TorrentClientError};

/// A recorded torrent addition for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAddTorrent {
    /// The request that was made.
    pub request: AddTorrentRequest,
    /// When the request was made.
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Track added torrents for assertions
/// - Preload known info hashes
/// - Simulate failures and rejections
///
/// Accepted torrents become visible to `list_info_hashes`, like a real
/// client would report them on the next refresh.
#[derive(Debug)]
pub struct MockTorrentClient {
    /// Recorded add_torrent calls.
    added: Arc<RwLock<Vec<RecordedAddTorrent>>>,
    /// Hashes reported by `list_info_hashes`.
    known: Arc<RwLock<HashSet<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TorrentClientError>>>,
    /// Whether add_torrent answers `false`.
    reject_adds: Arc<RwLock<bool>>,
}

impl Default for MockTorrentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTorrentClient {
    /// Create a new mock torrent client.
    pub fn new() -> Self {
        Self {
            added: Arc::new(RwLock::new(Vec::new())),
            known: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            reject_adds: Arc::new(RwLock::new(false)),
        }
    }

    /// Create a mock client that already knows the given hashes.
    pub fn with_known_hashes<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known = hashes.into_iter().map(Into::into).collect();
        Self {
            known: Arc::new(RwLock::new(known)),
            ..Self::new()
        }
    }

    /// Get all recorded add_torrent calls.
    pub async fn added_torrents(&self) -> Vec<RecordedAddTorrent> {
        self.added.read().await.clone()
    }

    /// Clear recorded add_torrent calls.
    pub async fn clear_recorded(&self) {
        self.added.write().await.clear();
    }

    /// Make the next operation fail with the given error.
    pub async fn set_next_error(&self, error: TorrentClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make add_torrent answer `false` without recording the hash.
    pub async fn set_reject_adds(&self, reject: bool) {
        *self.reject_adds.write().await = reject;
    }

    /// Forget a hash, as if the torrent was removed from the client.
    pub async fn remove_hash(&self, hash: &str) {
        self.known.write().await.remove(hash);
    }

    async fn take_error(&self) -> Option<TorrentClientError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_info_hashes(&self) -> Result<HashSet<String>, TorrentClientError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.known.read().await.clone())
    }

    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<bool, TorrentClientError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let info_hash = request.info_hash.clone();
        self.added.write().await.push(RecordedAddTorrent {
            request,
            timestamp: Utc::now(),
        });

        if *self.reject_adds.read().await {
            return Ok(false);
        }
        self.known.write().await.insert(info_hash);
        Ok(true)
    }
}
