//! Torrent descriptor decoding.
//!
//! Uses librqbit-core to parse bencoded .torrent data into the declared file
//! tree and info-hash needed for matching.

mod parser;
mod types;

pub use parser::decode;
pub use types::{DeclaredFile, DescriptorError, TorrentDescriptor, TorrentLayout};
