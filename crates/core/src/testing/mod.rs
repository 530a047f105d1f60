//! Testing utilities and mock implementations.
//!
//! This module provides a mock `TorrentClient` and fixtures for building
//! torrent descriptors and on-disk file trees, so the whole session flow can
//! be exercised without a running client.
//!
//! # Example
//!
//! ```rust,ignore
//! use seedmatch_core::testing::{fixtures, MockTorrentClient};
//!
//! let client = MockTorrentClient::new();
//! let bytes = fixtures::torrent_bytes("Release", &[(&["CD1", "a.r00"], 11)])?;
//! fixtures::create_file(source_root, &["Release", "CD1", "a.r00"], 11)?;
//! ```

mod mock_torrent_client;

pub use mock_torrent_client::{MockTorrentClient, RecordedAddTorrent};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io;
    use std::path::{Path, PathBuf};

    use librqbit_bencode::{bencode_serialize_to_writer, ByteBufOwned, SerError};
    use serde::Serialize;

    const PIECE_LENGTH: u64 = 16384;

    #[derive(Serialize)]
    struct MetaInfo<'a> {
        announce: &'a str,
        info: Info<'a>,
    }

    #[derive(Serialize)]
    struct Info<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        files: Option<Vec<FileEntry<'a>>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        length: Option<u64>,
        name: &'a str,
        #[serde(rename = "piece length")]
        piece_length: u64,
        pieces: ByteBufOwned,
    }

    #[derive(Serialize)]
    struct FileEntry<'a> {
        length: u64,
        path: &'a [&'a str],
    }

    /// Zeroed piece hashes covering `total` bytes.
    fn pieces(total: u64) -> ByteBufOwned {
        let count = total.div_ceil(PIECE_LENGTH).max(1) as usize;
        ByteBufOwned::from(vec![0u8; count * 20])
    }

    fn encode(info: Info<'_>) -> Result<Vec<u8>, SerError> {
        let mut out = Vec::new();
        bencode_serialize_to_writer(
            MetaInfo {
                announce: "http://tracker.example/announce",
                info,
            },
            &mut out,
        )?;
        Ok(out)
    }

    /// Bencoded multi-file torrent with the given files (path segments, length).
    pub fn torrent_bytes(name: &str, files: &[(&[&str], u64)]) -> Result<Vec<u8>, SerError> {
        encode(Info {
            files: Some(
                files
                    .iter()
                    .map(|(path, length)| FileEntry {
                        length: *length,
                        path: *path,
                    })
                    .collect(),
            ),
            length: None,
            name,
            piece_length: PIECE_LENGTH,
            pieces: pieces(files.iter().map(|(_, l)| l).sum()),
        })
    }

    /// Bencoded single-file torrent.
    pub fn single_file_torrent_bytes(name: &str, length: u64) -> Result<Vec<u8>, SerError> {
        encode(Info {
            files: None,
            length: Some(length),
            name,
            piece_length: PIECE_LENGTH,
            pieces: pieces(length),
        })
    }

    /// Writes `size` bytes to `root/<segments>`, creating parents.
    pub fn create_file(root: &Path, segments: &[&str], size: usize) -> io::Result<PathBuf> {
        let path = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, "x".repeat(size))?;
        Ok(path)
    }

    /// Writes descriptor bytes to `dir/<file_name>`.
    pub fn write_torrent(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = dir.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}
