//! Info-hash derivation for downloaded .torrent files.
//!
//! Uses librqbit-core to parse the bencoded metainfo; the hash is the SHA-1
//! of the raw `info` dictionary, exactly as torrent clients compute it.

use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};

use super::FetchError;

/// Derive the 40-character uppercase hex info hash of a .torrent file.
pub fn info_hash_from_torrent(bytes: &[u8]) -> Result<String, FetchError> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| FetchError::InvalidTorrent(e.to_string()))?;

    Ok(torrent.info_hash.as_string().to_uppercase())
}
