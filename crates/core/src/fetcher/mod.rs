//! Retrieval of .torrent files and magnet shortcuts.
//!
//! The fetcher turns an accepted search result into a file in the save
//! directory. Downloaded .torrent files are hashed first and discarded when
//! the torrent client already has them.

mod downloader;
mod info_hash;
mod naming;
mod shortcut;

pub use downloader::{HttpDownloader, TorrentDownloader};
pub use info_hash::info_hash_from_torrent;
pub use naming::{release_file_name, sanitize_name, truncate_name, unique_path};
pub use shortcut::ShortcutStyle;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::searcher::SearchResult;

const TORRENT_EXTENSION: &str = ".torrent";

/// Errors that can occur while fetching a result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("Invalid torrent file: {0}")]
    InvalidTorrent(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the fetcher did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// File written to this path.
    Written(PathBuf),
    /// The downloaded torrent's info hash is already loaded in the client.
    SkippedDuplicateHash(String),
    SkippedNoLink,
}

/// Writes accepted results into the save directory.
pub struct Fetcher {
    downloader: Arc<dyn TorrentDownloader>,
    save_path: PathBuf,
    shortcut_style: ShortcutStyle,
}

impl Fetcher {
    pub fn new(
        downloader: Arc<dyn TorrentDownloader>,
        save_path: impl Into<PathBuf>,
        shortcut_style: ShortcutStyle,
    ) -> Self {
        Self {
            downloader,
            save_path: save_path.into(),
            shortcut_style,
        }
    }

    /// Fetch one result. Returns only after any written file is synced.
    pub async fn fetch(
        &self,
        result: &SearchResult,
        existing_hashes: &HashSet<String>,
    ) -> Result<FetchOutcome, FetchError> {
        let Some(link) = result.link.as_deref() else {
            return Ok(FetchOutcome::SkippedNoLink);
        };
        let name = release_file_name(&result.tracker, &result.title);

        if result.is_magnet() {
            let ext = self.shortcut_style.extension();
            let path = unique_path(&self.save_path, &name, ext);
            write_synced(&path, self.shortcut_style.render(link).as_bytes()).await?;
            return Ok(FetchOutcome::Written(path));
        }

        let bytes = self.downloader.download(link).await?;
        let info_hash = info_hash_from_torrent(&bytes)?;
        debug!(tracker = %result.tracker, title = %result.title, info_hash = %info_hash, "Downloaded torrent");

        if existing_hashes.contains(&info_hash) {
            return Ok(FetchOutcome::SkippedDuplicateHash(info_hash));
        }

        let path = unique_path(&self.save_path, &name, TORRENT_EXTENSION);
        write_synced(&path, &bytes).await?;
        Ok(FetchOutcome::Written(path))
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> Result<(), FetchError> {
    let write_error = |source| FetchError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
    file.write_all(contents).await.map_err(write_error)?;
    file.sync_all().await.map_err(write_error)?;
    Ok(())
}
