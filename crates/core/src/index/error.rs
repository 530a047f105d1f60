//! Error types for the content index.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, querying or persisting the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A configured source root is missing or cannot be read.
    #[error("Source root is not readable: {path}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking below a root failed.
    #[error("Failed to scan {path}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ignore pattern is not a valid regular expression.
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The persisted index was built with other normalization rules.
    #[error("Persisted index uses different normalization rules, rebuild required")]
    RulesChanged,

    /// The persisted index was built with other scan settings.
    #[error("Persisted index was built with a different {0} setting, rebuild required")]
    SettingsChanged(&'static str),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for IndexError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
