//! Linker module for materializing matched torrents on disk.
//!
//! For `MatchMode::Link` results the `FsLinker` builds the torrent's folder
//! layout under a destination directory and links every matched file into
//! it, either as symbolic or hard links. `MatchMode::Exact` results are
//! seeded in place and need no filesystem work.
//!
//! # Example
//!
//! ```ignore
//! use seedmatch_core::linker::{FsLinker, LinkType};
//!
//! let linker = FsLinker::new(LinkType::Soft);
//! let summary = linker.link(&destination, &match_result).await?;
//! println!("linked {} files, skipped {}", summary.linked, summary.skipped);
//! ```

mod error;
mod fs_linker;
mod types;

pub use error::LinkerError;
pub use fs_linker::FsLinker;
pub use types::{LinkSummary, LinkType};
