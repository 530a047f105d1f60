//! Types for the session controller.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::error::SessionError;
use crate::config::{Config, PolicyConfig};
use crate::descriptor::TorrentLayout;
use crate::linker::LinkType;
use crate::matcher::{FileMatch, MatchMode};

/// Decision taken for one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Linked (if needed) and registered with the client.
    Ok,
    /// The client already knows the info-hash.
    AlreadySeeding,
    /// The destination folder exists but the client does not seed it.
    FolderExistNotSeeding,
    /// Too much content is missing to accept the torrent.
    MissingFiles,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::AlreadySeeding => "already_seeding",
            Status::FolderExistNotSeeding => "folder_exist_not_seeding",
            Status::MissingFiles => "missing_files",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handling one descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub status: Status,
    pub info_hash: String,
    pub name: String,
    /// Content root handed (or that would be handed) to the client.
    pub destination: PathBuf,
    pub found_size: u64,
    pub missing_size: u64,
    /// `None` when the decision was taken before matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MatchMode>,
}

/// Side-effect free view of how a descriptor would be matched.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub info_hash: String,
    pub name: String,
    pub layout: TorrentLayout,
    pub destination: PathBuf,
    pub mode: MatchMode,
    pub files: Vec<FileMatch>,
    pub found_size: u64,
    pub missing_size: u64,
    /// Whether the missing content is within the configured tolerance.
    pub within_tolerance: bool,
}

/// One entry of a batch run, in input order.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<SessionOutcome, SessionError>,
}

/// Settings the session needs from the configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Root under which one folder per torrent is created.
    pub store_path: PathBuf,
    pub link_type: LinkType,
    pub exact_mode: bool,
    pub policy: PolicyConfig,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            store_path: config.linker.store_path.clone(),
            link_type: config.linker.link_type,
            exact_mode: config.index.exact_mode,
            policy: config.policy.clone(),
        }
    }

    /// Whether `missing` of `total` bytes may be absent.
    ///
    /// Either threshold is sufficient on its own.
    pub fn within_tolerance(&self, missing: u64, total: u64) -> bool {
        if missing == 0 {
            return true;
        }
        if missing <= self.policy.add_limit_size {
            return true;
        }
        total > 0 && (missing as f64 / total as f64) * 100.0 <= self.policy.add_limit_percent
    }
}
