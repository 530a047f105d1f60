//! Torrent client abstraction.
//!
//! The session controller talks to the seeding client through the
//! `TorrentClient` trait: it asks which info-hashes the client already knows
//! and registers new torrents against an existing content directory.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
