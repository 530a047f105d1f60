//! Error types for the session controller.

use std::path::PathBuf;
use thiserror::Error;

use crate::descriptor::DescriptorError;
use crate::linker::LinkerError;
use crate::torrent_client::TorrentClientError;

/// Per-torrent failures. Policy outcomes are reported as a `Status`, not here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The descriptor file could not be read.
    #[error("failed to read descriptor {path}")]
    ReadDescriptor {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor decoding error.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Linker error.
    #[error("linker error: {0}")]
    Linker(#[from] LinkerError),

    /// Torrent client error.
    #[error("torrent client error: {0}")]
    TorrentClient(#[from] TorrentClientError),
}
