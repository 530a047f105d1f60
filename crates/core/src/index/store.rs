//! SQLite persistence for the content index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tracing::debug;

use super::content_index::ContentIndex;
use super::error::IndexError;
use super::types::{DirectorySignature, IndexKey};
use crate::config::IndexConfig;

const RULES_KEY: &str = "normalize_rules";
const DIRECTORY_INDEX_KEY: &str = "directory_index";
const IGNORE_KEY: &str = "ignore_patterns";

/// SQLite-backed store for a built `ContentIndex`.
pub struct IndexStore {
    conn: Mutex<Connection>,
}

impl IndexStore {
    /// Open (or create) the index database at `path`.
    pub fn new(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), IndexError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS indexed_files (
                size INTEGER NOT NULL,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                PRIMARY KEY (size, name)
            );

            CREATE TABLE IF NOT EXISTS indexed_directories (
                digest BLOB NOT NULL,
                total_size INTEGER NOT NULL,
                file_count INTEGER NOT NULL,
                path TEXT NOT NULL,
                PRIMARY KEY (digest, total_size, file_count)
            );

            CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, IndexError> {
        self.conn
            .lock()
            .map_err(|_| IndexError::Database("connection lock poisoned".to_string()))
    }

    /// Settings an index was built with, as stored in `index_meta`.
    fn settings_of(index: &ContentIndex) -> Result<[(&'static str, String); 3], IndexError> {
        let to_json = |e: serde_json::Error| IndexError::Database(e.to_string());
        Ok([
            (RULES_KEY, serde_json::to_string(index.rules()).map_err(to_json)?),
            (
                DIRECTORY_INDEX_KEY,
                index.directory_index_enabled().to_string(),
            ),
            (
                IGNORE_KEY,
                serde_json::to_string(&index.ignore_patterns()).map_err(to_json)?,
            ),
        ])
    }

    /// Replaces everything persisted with the contents of `index`.
    pub fn save(&self, index: &ContentIndex) -> Result<(), IndexError> {
        let settings = Self::settings_of(index)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM indexed_files", [])?;
        tx.execute("DELETE FROM indexed_directories", [])?;
        {
            let mut insert_file =
                tx.prepare("INSERT INTO indexed_files (size, name, path) VALUES (?1, ?2, ?3)")?;
            for (key, path) in index.file_entries() {
                insert_file.execute(params![
                    key.size as i64,
                    key.name,
                    path.to_string_lossy().into_owned()
                ])?;
            }

            let mut insert_dir = tx.prepare(
                "INSERT INTO indexed_directories (digest, total_size, file_count, path) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (sig, path) in index.directory_entries() {
                insert_dir.execute(params![
                    sig.digest.to_vec(),
                    sig.total_size as i64,
                    sig.file_count as i64,
                    path.to_string_lossy().into_owned()
                ])?;
            }
        }
        for (key, value) in &settings {
            tx.execute(
                "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;

        let stats = index.stats();
        debug!(
            files = stats.files,
            directories = stats.directories,
            "Persisted content index"
        );
        Ok(())
    }

    /// Loads the persisted index for the given configuration.
    ///
    /// Fails with `RulesChanged` when the stored index was built with other
    /// normalization rules, and with `SettingsChanged` when the directory
    /// index or the ignore patterns differ. A store that was never written
    /// yields an empty index.
    pub fn load(&self, config: &IndexConfig) -> Result<ContentIndex, IndexError> {
        let mut index = ContentIndex::from_config(config)?;
        let conn = self.lock()?;

        let mut meta_stmt = conn.prepare("SELECT key, value FROM index_meta")?;
        let stored: HashMap<String, String> = meta_stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<_, _>>()?;
        if stored.is_empty() {
            return Ok(index);
        }
        for (key, current) in Self::settings_of(&index)? {
            if stored.get(key) != Some(&current) {
                return Err(match key {
                    RULES_KEY => IndexError::RulesChanged,
                    DIRECTORY_INDEX_KEY => IndexError::SettingsChanged("directory index"),
                    _ => IndexError::SettingsChanged("ignore patterns"),
                });
            }
        }

        let mut file_stmt = conn.prepare("SELECT size, name, path FROM indexed_files")?;
        let files: HashMap<IndexKey, PathBuf> = file_stmt
            .query_map([], |row| {
                let size: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let path: String = row.get(2)?;
                Ok((IndexKey::new(size as u64, name), PathBuf::from(path)))
            })?
            .collect::<Result<_, _>>()?;

        let directories: HashMap<DirectorySignature, PathBuf> = if index.directory_index_enabled()
        {
            let mut dir_stmt = conn
                .prepare("SELECT digest, total_size, file_count, path FROM indexed_directories")?;
            let rows = dir_stmt
                .query_map([], |row| {
                    let digest: Vec<u8> = row.get(0)?;
                    let total_size: i64 = row.get(1)?;
                    let file_count: i64 = row.get(2)?;
                    let path: String = row.get(3)?;
                    Ok((digest, total_size, file_count, path))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let mut directories = HashMap::with_capacity(rows.len());
            for (digest, total_size, file_count, path) in rows {
                let digest: [u8; 32] = digest.try_into().map_err(|_| {
                    IndexError::Database(format!("corrupt directory digest for {}", path))
                })?;
                directories.insert(
                    DirectorySignature {
                        total_size: total_size as u64,
                        file_count: file_count as u64,
                        digest,
                    },
                    PathBuf::from(path),
                );
            }
            directories
        } else {
            HashMap::new()
        };

        index.restore(files, directories);
        Ok(index)
    }
}
