//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use seedmatch_core::{
    config::TorrentClientBackend,
    load_config,
    session::{inspect_descriptor, BatchEntry},
    validate_config, Config, ContentIndex, IndexError, IndexStore, QBittorrentClient,
    SanitizedConfig, SessionController, SessionSettings, TorrentClient,
};

pub fn load(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    let config =
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

pub fn print_config(config: &Config) -> Result<()> {
    let sanitized = SanitizedConfig::from(config);
    println!("{}", serde_json::to_string_pretty(&sanitized)?);
    Ok(())
}

pub fn rebuild(config: &Config) -> Result<()> {
    if config.index.source_roots.is_empty() {
        warn!("No source roots configured, the index will be empty");
    }

    let mut index = ContentIndex::from_config(&config.index).context("Invalid index settings")?;
    let stats = index
        .rebuild(&config.index.source_roots)
        .context("Failed to rebuild content index")?;

    let store = IndexStore::new(&config.database.path)
        .with_context(|| format!("Failed to open index database {:?}", config.database.path))?;
    store.save(&index).context("Failed to persist content index")?;

    println!(
        "indexed {} files and {} directories into {}",
        stats.files,
        stats.directories,
        config.database.path.display()
    );
    Ok(())
}

fn load_index(config: &Config) -> Result<ContentIndex> {
    let store = IndexStore::new(&config.database.path)
        .with_context(|| format!("Failed to open index database {:?}", config.database.path))?;
    match store.load(&config.index) {
        Ok(index) => {
            let stats = index.stats();
            info!(files = stats.files, directories = stats.directories, "Loaded content index");
            Ok(index)
        }
        Err(IndexError::RulesChanged) => {
            bail!("Normalization rules changed since the last rebuild, run `seedmatch rebuild`")
        }
        Err(IndexError::SettingsChanged(setting)) => {
            bail!("The {} setting changed since the last rebuild, run `seedmatch rebuild`", setting)
        }
        Err(e) => Err(e).context("Failed to load content index"),
    }
}

fn create_client(config: &Config) -> Result<Arc<dyn TorrentClient>> {
    let Some(client_config) = &config.torrent_client else {
        bail!("No [torrent_client] section configured");
    };
    match client_config.backend {
        TorrentClientBackend::QBittorrent => {
            let qb = client_config
                .qbittorrent
                .clone()
                .context("qbittorrent backend selected but [torrent_client.qbittorrent] is missing")?;
            info!("Using qBittorrent at {}", qb.url);
            Ok(Arc::new(QBittorrentClient::new(qb)?))
        }
    }
}

fn session(config: &Config) -> Result<SessionController> {
    let index = load_index(config)?;
    let client = create_client(config)?;
    Ok(SessionController::new(
        index,
        client,
        SessionSettings::from_config(config),
    ))
}

pub async fn add(config: &Config, torrents: &[PathBuf]) -> Result<bool> {
    let mut session = session(config)?;
    session
        .refresh_seeded()
        .await
        .context("Failed to fetch seeded torrents from client")?;

    let entries = session.handle_batch(torrents).await;
    for entry in &entries {
        println!("{}", status_line(entry));
    }
    Ok(entries.iter().all(|e| e.result.is_ok()))
}

/// Dry run: matches each torrent against the persisted index without a client.
pub async fn inspect(config: &Config, torrents: &[PathBuf]) -> Result<bool> {
    let index = load_index(config)?;
    let settings = SessionSettings::from_config(config);

    let mut all_ok = true;
    for path in torrents {
        let report = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))
            .and_then(|bytes| Ok(inspect_descriptor(&index, &settings, &bytes)?));
        match report {
            Ok(report) => println!(
                "{:<8} {} found={} missing={} tolerance={} -> {}",
                report.mode.as_str(),
                report.name,
                report.found_size,
                report.missing_size,
                if report.within_tolerance { "ok" } else { "exceeded" },
                report.destination.display()
            ),
            Err(e) => {
                all_ok = false;
                println!("{:<8} {}: {:#}", "error", path.display(), e);
            }
        }
    }
    Ok(all_ok)
}

fn status_line(entry: &BatchEntry) -> String {
    match &entry.result {
        Ok(outcome) => format!(
            "{:<24} {} ({}/{} bytes) -> {}",
            outcome.status.as_str(),
            outcome.name,
            outcome.found_size,
            outcome.found_size + outcome.missing_size,
            outcome.destination.display()
        ),
        Err(e) => format!("{:<24} {}: {}", "error", entry.path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedmatch_core::testing::fixtures;
    use seedmatch_core::{session::SessionOutcome, SessionError, Status};
    use tempfile::TempDir;

    fn config_for(dir: &Path) -> Config {
        seedmatch_core::load_config_from_str(&format!(
            r#"
[index]
source_roots = ["{src}"]

[database]
path = "{db}"

[linker]
store_path = "{store}"
"#,
            src = dir.join("src").display(),
            db = dir.join("index.db").display(),
            store = dir.join("store").display(),
        ))
        .unwrap()
    }

    #[test]
    fn test_status_line_for_outcome() {
        let entry = BatchEntry {
            path: PathBuf::from("a.torrent"),
            result: Ok(SessionOutcome {
                status: Status::Ok,
                info_hash: "abc".to_string(),
                name: "Release".to_string(),
                destination: PathBuf::from("/store/Release"),
                found_size: 22,
                missing_size: 11,
                mode: None,
            }),
        };
        let line = status_line(&entry);
        assert!(line.starts_with("ok "));
        assert!(line.contains("Release (22/33 bytes) -> /store/Release"));
    }

    #[test]
    fn test_status_line_for_error() {
        let entry = BatchEntry {
            path: PathBuf::from("bad.torrent"),
            result: Err(SessionError::Descriptor(
                seedmatch_core::DescriptorError::MissingFiles,
            )),
        };
        assert!(status_line(&entry).starts_with("error"));
    }

    #[test]
    fn test_rebuild_then_load_index() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/Release")).unwrap();
        std::fs::write(dir.path().join("src/Release/a.bin"), "abc").unwrap();
        let config = config_for(dir.path());

        rebuild(&config).unwrap();
        let index = load_index(&config).unwrap();
        assert!(index.lookup_file(3, "a.bin").is_some());
    }

    #[tokio::test]
    async fn test_dry_run_without_client_section() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fixtures::create_file(&src, &["Release", "a.bin"], 3).unwrap();
        let torrent = fixtures::write_torrent(
            dir.path(),
            "release.torrent",
            &fixtures::torrent_bytes("Release", &[(&["a.bin"], 3)]).unwrap(),
        )
        .unwrap();
        let config = config_for(dir.path());
        assert!(config.torrent_client.is_none());

        rebuild(&config).unwrap();
        assert!(inspect(&config, &[torrent.clone()]).await.unwrap());
        assert!(!dir.path().join("store").exists());
        assert!(torrent.exists());
    }

    #[test]
    fn test_load_index_asks_for_rebuild_after_settings_change() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let mut config = config_for(dir.path());
        rebuild(&config).unwrap();

        config.index.exact_mode = true;
        let err = load_index(&config).unwrap_err();
        assert!(err.to_string().contains("seedmatch rebuild"));
    }

    #[test]
    fn test_create_client_requires_section() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path());
        assert!(create_client(&config).is_err());
    }
}
