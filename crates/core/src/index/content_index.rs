//! The in-memory content index.

use regex_lite::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::error::IndexError;
use super::normalize::NormalizeRules;
use super::scan::{compile_patterns, scan_root, ScannedFile};
use super::types::{DirectoryListing, DirectorySignature, IndexKey, IndexStats};
use crate::config::IndexConfig;

/// Lookup structure over the files below the configured source roots.
#[derive(Debug)]
pub struct ContentIndex {
    rules: NormalizeRules,
    ignore: Vec<Regex>,
    directory_index_enabled: bool,
    files: HashMap<IndexKey, PathBuf>,
    directories: HashMap<DirectorySignature, PathBuf>,
}

impl ContentIndex {
    /// Creates an empty index.
    pub fn new(
        rules: NormalizeRules,
        ignore_patterns: &[String],
        directory_index_enabled: bool,
    ) -> Result<Self, IndexError> {
        Ok(Self {
            rules,
            ignore: compile_patterns(ignore_patterns)?,
            directory_index_enabled,
            files: HashMap::new(),
            directories: HashMap::new(),
        })
    }

    /// Creates an empty index configured from the `[index]` section.
    pub fn from_config(config: &IndexConfig) -> Result<Self, IndexError> {
        Self::new(
            config.normalization.clone(),
            &config.ignore_patterns,
            config.directory_index_enabled(),
        )
    }

    pub fn rules(&self) -> &NormalizeRules {
        &self.rules
    }

    pub fn directory_index_enabled(&self) -> bool {
        self.directory_index_enabled
    }

    pub fn ignore_patterns(&self) -> Vec<&str> {
        self.ignore.iter().map(Regex::as_str).collect()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            files: self.files.len(),
            directories: self.directories.len(),
        }
    }

    /// Rescans `roots` and replaces the whole index.
    ///
    /// Roots are scanned in order; when two files share a key the first one
    /// seen wins. If any root fails to scan, the current maps are kept.
    pub fn rebuild(&mut self, roots: &[PathBuf]) -> Result<IndexStats, IndexError> {
        let started = Instant::now();
        let mut files: HashMap<IndexKey, PathBuf> = HashMap::new();
        let mut directories: HashMap<DirectorySignature, PathBuf> = HashMap::new();

        for root in roots {
            let scanned = scan_root(root, &self.ignore)?;
            debug!(root = %root.display(), files = scanned.len(), "Scanned source root");

            for file in &scanned {
                let Some(name) = file.segments.last() else {
                    continue;
                };
                files
                    .entry(IndexKey::new(file.size, self.rules.normalize(name)))
                    .or_insert_with(|| file.path.clone());
            }

            if self.directory_index_enabled {
                for (signature, path) in self.directory_signatures(root, &scanned) {
                    directories.entry(signature).or_insert(path);
                }
            }
        }

        self.files = files;
        self.directories = directories;

        let stats = self.stats();
        info!(
            files = stats.files,
            directories = stats.directories,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Content index rebuilt"
        );
        Ok(stats)
    }

    /// Signatures of `root` and every directory below it that holds files,
    /// ordered by path so that parents come before their children.
    fn directory_signatures(
        &self,
        root: &Path,
        scanned: &[ScannedFile],
    ) -> Vec<(DirectorySignature, PathBuf)> {
        let mut entries: HashMap<PathBuf, Vec<(String, u64)>> = HashMap::new();

        for file in scanned {
            let normalized: Vec<String> =
                file.segments.iter().map(|s| self.rules.normalize(s)).collect();
            let mut dir = root.to_path_buf();
            for depth in 0..normalized.len() {
                entries
                    .entry(dir.clone())
                    .or_default()
                    .push((normalized[depth..].join("/"), file.size));
                if depth + 1 < normalized.len() {
                    dir.push(&file.segments[depth]);
                }
            }
        }

        let mut signatures: Vec<(DirectorySignature, PathBuf)> = entries
            .into_iter()
            .filter_map(|(dir, pairs)| DirectorySignature::compute(pairs).map(|sig| (sig, dir)))
            .collect();
        signatures.sort_by(|a, b| a.1.cmp(&b.1));
        signatures
    }

    /// Looks up a file by size and name; the name is normalized first.
    pub fn lookup_file(&self, size: u64, name: &str) -> Option<&Path> {
        self.files
            .get(&IndexKey::new(size, self.rules.normalize(name)))
            .map(PathBuf::as_path)
    }

    /// Looks up a directory by signature. Always `None` when the directory
    /// index is disabled.
    pub fn lookup_directory(&self, signature: &DirectorySignature) -> Option<&Path> {
        if !self.directory_index_enabled {
            return None;
        }
        self.directories.get(signature).map(PathBuf::as_path)
    }

    /// Lists the files currently below `dir`, keyed by normalized relative path.
    pub fn list_directory(&self, dir: &Path) -> Result<DirectoryListing, IndexError> {
        let scanned = scan_root(dir, &self.ignore)?;
        Ok(scanned
            .into_iter()
            .map(|f| (self.rules.normalize_segments(&f.segments), (f.path, f.size)))
            .collect())
    }

    pub(crate) fn file_entries(&self) -> impl Iterator<Item = (&IndexKey, &PathBuf)> {
        self.files.iter()
    }

    pub(crate) fn directory_entries(&self) -> impl Iterator<Item = (&DirectorySignature, &PathBuf)> {
        self.directories.iter()
    }

    /// Replaces both maps with previously persisted entries.
    pub(crate) fn restore(
        &mut self,
        files: HashMap<IndexKey, PathBuf>,
        directories: HashMap<DirectorySignature, PathBuf>,
    ) {
        self.files = files;
        self.directories = directories;
    }

    #[cfg(test)]
    pub(crate) fn add_file(&mut self, path: impl Into<PathBuf>, size: u64) {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files
            .insert(IndexKey::new(size, self.rules.normalize(&name)), path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, size: usize) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x".repeat(size)).unwrap();
        path
    }

    fn index(directory_index: bool) -> ContentIndex {
        ContentIndex::new(NormalizeRules::default(), &[], directory_index).unwrap()
    }

    #[test]
    fn test_lookup_file_normalizes_name() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "Some Movie.mkv", 10);

        let mut idx = index(false);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(idx.lookup_file(10, "some-movie.MKV"), Some(path.as_path()));
        assert_eq!(idx.lookup_file(11, "Some Movie.mkv"), None);
        assert_eq!(idx.lookup_file(10, "Other.mkv"), None);
    }

    #[test]
    fn test_first_root_wins_on_duplicate_key() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let a = write(first.path(), "dup.bin", 4);
        write(second.path(), "dup.bin", 4);

        let mut idx = index(false);
        idx.rebuild(&[first.path().to_path_buf(), second.path().to_path_buf()])
            .unwrap();
        assert_eq!(idx.lookup_file(4, "dup.bin"), Some(a.as_path()));
        assert_eq!(idx.stats().files, 1);
    }

    #[test]
    fn test_directory_index_disabled_returns_none() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "rel/a.txt", 1);

        let mut idx = index(false);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();
        let sig = DirectorySignature::compute(vec![("a_txt", 1)]).unwrap();
        assert_eq!(idx.lookup_directory(&sig), None);
        assert_eq!(idx.stats().directories, 0);
    }

    #[test]
    fn test_directory_signature_lookup() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Release/CD1/a.r00", 3);
        write(dir.path(), "Release/CD2/a.r00", 3);
        write(dir.path(), "Release/info.nfo", 2);

        let mut idx = index(true);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();

        let sig = DirectorySignature::compute(vec![
            ("info_nfo", 2),
            ("cd2/a_r00", 3),
            ("cd1/a_r00", 3),
        ])
        .unwrap();
        assert_eq!(
            idx.lookup_directory(&sig),
            Some(dir.path().join("Release").as_path())
        );

        let cd1 = DirectorySignature::compute(vec![("a_r00", 3)]).unwrap();
        assert_eq!(
            idx.lookup_directory(&cd1),
            Some(dir.path().join("Release").join("CD1").as_path())
        );
    }

    #[test]
    fn test_parent_with_single_child_has_distinct_signature() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Movie/BDMV/index.bdmv", 5);

        let mut idx = index(true);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();

        let movie = DirectorySignature::compute(vec![("bdmv/index_bdmv", 5)]).unwrap();
        let bdmv = DirectorySignature::compute(vec![("index_bdmv", 5)]).unwrap();
        assert_eq!(
            idx.lookup_directory(&movie),
            Some(dir.path().join("Movie").as_path())
        );
        assert_eq!(
            idx.lookup_directory(&bdmv),
            Some(dir.path().join("Movie").join("BDMV").as_path())
        );
    }

    #[test]
    fn test_rebuild_replaces_stale_entries() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "old.txt", 2);

        let mut idx = index(true);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();
        assert!(idx.lookup_file(2, "old.txt").is_some());

        fs::remove_file(path).unwrap();
        write(dir.path(), "new.txt", 2);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();

        assert!(idx.lookup_file(2, "old.txt").is_none());
        assert!(idx.lookup_file(2, "new.txt").is_some());
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_maps() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "kept.txt", 6);

        let mut idx = index(true);
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();
        let before = idx.stats();

        let result = idx.rebuild(&[dir.path().to_path_buf(), dir.path().join("missing")]);
        assert!(matches!(result, Err(IndexError::RootUnreadable { .. })));
        assert_eq!(idx.stats(), before);
        assert!(idx.lookup_file(6, "kept.txt").is_some());
    }

    #[test]
    fn test_list_directory_keys_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "Sub Dir/File-A.txt", 1);

        let idx = index(true);
        let listing = idx.list_directory(dir.path()).unwrap();
        assert_eq!(listing.get("sub_dir/file_a_txt"), Some(&(path, 1)));
    }

    #[test]
    fn test_ignore_patterns_apply_to_rebuild() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "movie.mkv", 8);
        write(dir.path(), "movie.mkv.part", 8);

        let mut idx =
            ContentIndex::new(NormalizeRules::default(), &["\\.part$".to_string()], false)
                .unwrap();
        idx.rebuild(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(idx.stats().files, 1);
    }
}
