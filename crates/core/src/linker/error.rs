//! Error types for the linker module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while linking matched files.
#[derive(Debug, Error)]
pub enum LinkerError {
    /// Link target already exists.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Failed to create a destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a link.
    #[error("Failed to link {source} to {destination}")]
    LinkFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Matched source could not be made absolute.
    #[error("Failed to resolve source path: {path}")]
    SourceResolutionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LinkerError {
    /// Creates a link failed error.
    pub fn link_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::LinkFailed {
            source,
            destination,
            error,
        }
    }

    /// Whether a hard link failed because source and target live on
    /// different filesystems (EXDEV, 18 on Linux).
    pub fn is_cross_device(&self) -> bool {
        match self {
            Self::LinkFailed { error, .. } => {
                error.kind() == std::io::ErrorKind::CrossesDevices || error.raw_os_error() == Some(18)
            }
            _ => false,
        }
    }
}
