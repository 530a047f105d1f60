//! Types for torrent client operations.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::matcher::FileMatch;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid torrent data: {0}")]
    InvalidTorrent(String),

    #[error("API error: {0}")]
    ApiError(String),

    /// The client answered but refused to register the torrent.
    #[error("Torrent rejected by client: {0}")]
    Rejected(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Request to register a torrent against content that is already on disk.
#[derive(Debug, Clone, Serialize)]
pub struct AddTorrentRequest {
    /// Raw .torrent file bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Info hash (lowercase hex).
    pub info_hash: String,
    /// Torrent name, used as the upload filename.
    pub name: String,
    /// Directory holding the torrent's content (no extra root folder).
    pub destination: PathBuf,
    /// Declared files and where they were found.
    pub files: Vec<FileMatch>,
}

impl AddTorrentRequest {
    /// Number of declared files present in `destination`.
    pub fn completed_files(&self) -> usize {
        self.files.iter().filter(|f| f.completed).count()
    }
}

/// Trait for torrent client backends.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Info hashes (lowercase hex) of every torrent the client knows.
    async fn list_info_hashes(&self) -> Result<HashSet<String>, TorrentClientError>;

    /// Register a torrent. `Ok(false)` means the client declined it.
    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<bool, TorrentClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DeclaredFile;

    #[test]
    fn test_completed_files() {
        let request = AddTorrentRequest {
            data: vec![0u8; 10],
            info_hash: "abc".to_string(),
            name: "Release".to_string(),
            destination: PathBuf::from("/store/Release"),
            files: vec![
                FileMatch::new(&DeclaredFile::new(["a"], 1), Some(PathBuf::from("/src/a"))),
                FileMatch::new(&DeclaredFile::new(["b"], 1), None),
            ],
        };
        assert_eq!(request.completed_files(), 1);
    }

    #[test]
    fn test_request_serialization_skips_data() {
        let request = AddTorrentRequest {
            data: vec![1, 2, 3],
            info_hash: "abc".to_string(),
            name: "Release".to_string(),
            destination: PathBuf::from("/store/Release"),
            files: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["info_hash"], "abc");
    }

    #[test]
    fn test_error_display() {
        let err = TorrentClientError::Rejected("Fails.".to_string());
        assert_eq!(err.to_string(), "Torrent rejected by client: Fails.");
    }
}
