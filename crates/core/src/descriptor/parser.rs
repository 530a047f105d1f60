//! Torrent file parser - extracts the declared file tree from .torrent files.

use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};

use super::types::{DeclaredFile, DescriptorError, TorrentDescriptor, TorrentLayout};

/// Decode a .torrent file into its declared files and info-hash.
///
/// Supports both single-file and multi-file torrents. A multi-file torrent
/// with an empty file list is valid and yields no files. Path segments that
/// could escape the destination folder (`..`, separators, empty segments)
/// are rejected.
pub fn decode(bytes: &[u8]) -> Result<TorrentDescriptor, DescriptorError> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| DescriptorError::ParseError(e.to_string()))?;

    let info = &torrent.info;
    let info_hash = torrent.info_hash.as_string();

    // Root name (folder name for multi-file, file name for single-file)
    let name = info
        .name
        .as_ref()
        .map(|b| bytes_to_string(b.as_ref()))
        .unwrap_or_else(|| info_hash.clone());

    if let Some(ref files) = info.files {
        let mut declared = Vec::with_capacity(files.len());
        for file in files {
            let mut path = Vec::with_capacity(file.path.len());
            for part in &file.path {
                path.push(checked_segment(bytes_to_string(part.as_ref()))?);
            }
            if path.is_empty() {
                return Err(DescriptorError::UnsafePath(String::new()));
            }
            declared.push(DeclaredFile {
                path,
                length: file.length,
            });
        }

        Ok(TorrentDescriptor {
            name,
            info_hash,
            layout: TorrentLayout::MultiFile,
            files: declared,
        })
    } else if let Some(length) = info.length {
        let name = checked_segment(name)?;
        Ok(TorrentDescriptor {
            files: vec![DeclaredFile {
                path: vec![name.clone()],
                length,
            }],
            name,
            info_hash,
            layout: TorrentLayout::SingleFile,
        })
    } else {
        Err(DescriptorError::MissingFiles)
    }
}

fn checked_segment(segment: String) -> Result<String, DescriptorError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
    {
        return Err(DescriptorError::UnsafePath(segment));
    }
    Ok(segment)
}

/// Convert bytes to a string, replacing invalid UTF-8.
fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
