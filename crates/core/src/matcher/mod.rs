//! Matching of declared torrent files against the content index.
//!
//! The matcher first tries to resolve a multi-file torrent as one unit via
//! its directory signature, then falls back to per-file lookups by size and
//! normalized name. Its output keeps the torrent's declared file order.

mod engine;
mod types;

pub use engine::Matcher;
pub use types::{FileMatch, MatchMode, MatchResult};
