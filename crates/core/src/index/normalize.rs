//! Filename normalization.
//!
//! Names are compared after normalization so that cosmetically different
//! spellings of the same file (`Some Release.mkv`, `some.release.mkv`,
//! `Some-Release.mkv`) produce the same key. The default rule lowercases the
//! name and folds space, dash and dot to `_`.

use serde::{Deserialize, Serialize};

/// Character used in place of every folded character.
pub const FOLD_TARGET: char = '_';

/// Configurable normalization rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeRules {
    /// Compare names case-insensitively.
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Characters replaced by `_`.
    #[serde(default = "default_fold_chars")]
    pub fold_chars: String,
    /// Characters removed entirely.
    #[serde(default)]
    pub strip_chars: String,
}

fn default_true() -> bool {
    true
}

fn default_fold_chars() -> String {
    " -.".to_string()
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            lowercase: true,
            fold_chars: default_fold_chars(),
            strip_chars: String::new(),
        }
    }
}

impl NormalizeRules {
    /// Normalizes a single path segment.
    pub fn normalize(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            if self.strip_chars.contains(c) {
                continue;
            }
            if self.fold_chars.contains(c) {
                out.push(FOLD_TARGET);
            } else if self.lowercase {
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Normalizes every segment and joins them with `/`.
    pub fn normalize_segments<S: AsRef<str>>(&self, segments: &[S]) -> String {
        segments
            .iter()
            .map(|s| self.normalize(s.as_ref()))
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_fold_separators_and_case() {
        let rules = NormalizeRules::default();
        assert_eq!(rules.normalize("Some Release.MKV"), "some_release_mkv");
        assert_eq!(rules.normalize("some-release.mkv"), "some_release_mkv");
        assert_eq!(rules.normalize("some_release.mkv"), "some_release_mkv");
    }

    #[test]
    fn test_strip_chars() {
        let rules = NormalizeRules {
            strip_chars: "'!".to_string(),
            ..Default::default()
        };
        assert_eq!(rules.normalize("Don't Stop!.flac"), "dont_stop_flac");
    }

    #[test]
    fn test_case_sensitive_rules() {
        let rules = NormalizeRules {
            lowercase: false,
            fold_chars: String::new(),
            strip_chars: String::new(),
        };
        assert_eq!(rules.normalize("File A.txt"), "File A.txt");
        assert_ne!(rules.normalize("a.txt"), rules.normalize("A.txt"));
    }

    #[test]
    fn test_unicode_lowercase() {
        let rules = NormalizeRules::default();
        assert_eq!(rules.normalize("ÄÖÜ"), "äöü");
    }

    #[test]
    fn test_normalize_segments_joins_with_slash() {
        let rules = NormalizeRules::default();
        assert_eq!(
            rules.normalize_segments(&["CD1", "Some File.r00"]),
            "cd1/some_file_r00"
        );
        let empty: [&str; 0] = [];
        assert_eq!(rules.normalize_segments(&empty), "");
    }
}
