use regex_lite::Regex;

use super::{types::Config, ConfigError, TorrentClientBackend};

/// Validate configuration
/// Currently validates:
/// - Linker section exists (enforced by serde) and has a store path
/// - add_limit_percent lies within 0..=100
/// - Ignore patterns compile
/// - The selected torrent client backend has its section
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.linker.store_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "linker.store_path cannot be empty".to_string(),
        ));
    }

    let percent = config.policy.add_limit_percent;
    if !(0.0..=100.0).contains(&percent) {
        return Err(ConfigError::ValidationError(format!(
            "policy.add_limit_percent must be between 0 and 100, got {}",
            percent
        )));
    }

    for pattern in &config.index.ignore_patterns {
        Regex::new(pattern).map_err(|e| {
            ConfigError::ValidationError(format!(
                "index.ignore_patterns entry '{}' is invalid: {}",
                pattern, e
            ))
        })?;
    }

    if let Some(tc) = &config.torrent_client {
        match tc.backend {
            TorrentClientBackend::QBittorrent => {
                if tc.qbittorrent.is_none() {
                    return Err(ConfigError::ValidationError(
                        "torrent_client.backend is qbittorrent but [torrent_client.qbittorrent] is missing"
                            .to_string(),
                    ));
                }
            }
        }
    }

    Ok(())
}
