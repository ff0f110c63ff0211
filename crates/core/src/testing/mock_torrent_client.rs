//! Mock torrent client for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::torrent_client::{TorrentClient, TorrentClientError};

/// Mock implementation of the TorrentClient trait.
///
/// Holds a fixed set of loaded info hashes and can be told to fail the next
/// call.
#[derive(Debug, Default)]
pub struct MockTorrentClient {
    /// Info hashes reported as loaded.
    hashes: Arc<RwLock<HashSet<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TorrentClientError>>>,
    /// Number of `list_info_hashes` calls.
    hash_fetches: AtomicUsize,
}

impl MockTorrentClient {
    /// Create a new mock torrent client with no torrents loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with the given info hashes loaded.
    pub fn with_hashes<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hashes: Arc::new(RwLock::new(hashes.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TorrentClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of times the hash list was fetched.
    pub fn hash_fetch_count(&self) -> usize {
        self.hash_fetches.load(Ordering::SeqCst)
    }

    async fn check_error(&self) -> Result<(), TorrentClientError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_methods(&self) -> Result<Vec<String>, TorrentClientError> {
        self.check_error().await?;
        Ok(vec![
            "system.listMethods".to_string(),
            "download_list".to_string(),
        ])
    }

    async fn list_info_hashes(&self) -> Result<HashSet<String>, TorrentClientError> {
        self.hash_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_error().await?;
        Ok(self.hashes.read().await.clone())
    }
}
