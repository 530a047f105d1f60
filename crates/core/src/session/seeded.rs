//! The set of info-hashes the client is known to seed.

use std::collections::HashSet;

/// Snapshot of the client's info-hashes.
///
/// Only changes through `replace`, which the session calls from
/// `refresh_seeded`. Hashes are stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct SeededSet {
    hashes: HashSet<String>,
}

impl SeededSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, info_hash: &str) -> bool {
        self.hashes.contains(&info_hash.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Replaces the whole snapshot.
    pub fn replace<I, S>(&mut self, hashes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hashes = hashes
            .into_iter()
            .map(|h| h.as_ref().to_lowercase())
            .collect();
    }
}

impl<S: AsRef<str>> FromIterator<S> for SeededSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SeededSet::new();
        set.replace(iter);
        set
    }
}
