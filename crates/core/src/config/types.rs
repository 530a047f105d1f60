use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::index::NormalizeRules;
use crate::linker::LinkType;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub linker: LinkerConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub torrent_client: Option<TorrentClientConfig>,
}

/// Content index configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Directories scanned by `rebuild`, in priority order.
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,
    /// Build and consult the directory signature index.
    #[serde(default)]
    pub unsplitable_mode: bool,
    /// Allow whole-directory matches to be seeded in place.
    #[serde(default)]
    pub exact_mode: bool,
    /// Regular expressions matched against file and directory names.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub normalization: NormalizeRules,
}

impl IndexConfig {
    /// Whether the directory signature index must be built.
    pub fn directory_index_enabled(&self) -> bool {
        self.unsplitable_mode || self.exact_mode
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("seedmatch.db")
}

/// Where and how matched files are materialized
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkerConfig {
    /// Root under which one folder per torrent is created.
    pub store_path: PathBuf,
    #[serde(default)]
    pub link_type: LinkType,
}

/// Partial match acceptance and post-add behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Missing bytes tolerated regardless of percentage.
    #[serde(default)]
    pub add_limit_size: u64,
    /// Missing percentage (0-100) tolerated regardless of size.
    #[serde(default)]
    pub add_limit_percent: f64,
    /// Remove the .torrent file once the client accepted it.
    #[serde(default)]
    pub delete_original_after_add: bool,
}

/// Torrent client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentClientConfig {
    pub backend: TorrentClientBackend,
    /// Required when backend = "qbittorrent"
    #[serde(default)]
    pub qbittorrent: Option<QBittorrentConfig>,
}

/// Available torrent client backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TorrentClientBackend {
    #[serde(rename = "qbittorrent")]
    QBittorrent,
}

/// qBittorrent Web API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// Web UI URL (e.g., "http://localhost:8080")
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Category assigned to added torrents.
    #[serde(default)]
    pub category: Option<String>,
    /// Add torrents in the paused state.
    #[serde(default)]
    pub paused: bool,
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub index: IndexConfig,
    pub database: DatabaseConfig,
    pub linker: LinkerConfig,
    pub policy: PolicyConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_client: Option<SanitizedTorrentClientConfig>,
}

/// Sanitized torrent client config
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTorrentClientConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbittorrent: Option<SanitizedQBittorrentConfig>,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            index: config.index.clone(),
            database: config.database.clone(),
            linker: config.linker.clone(),
            policy: config.policy.clone(),
            torrent_client: config
                .torrent_client
                .as_ref()
                .map(|tc| SanitizedTorrentClientConfig {
                    backend: match tc.backend {
                        TorrentClientBackend::QBittorrent => "qbittorrent".to_string(),
                    },
                    qbittorrent: tc.qbittorrent.as_ref().map(|q| SanitizedQBittorrentConfig {
                        url: q.url.clone(),
                        username: q.username.clone(),
                        password_configured: !q.password.is_empty(),
                        timeout_secs: q.timeout_secs,
                    }),
                }),
        }
    }
}
