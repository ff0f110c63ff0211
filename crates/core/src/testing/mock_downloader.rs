//! Mock downloader for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, TorrentDownloader};

/// Serves canned bytes per URL and records every request.
///
/// Unknown URLs fail with `FetchError::Download`.
#[derive(Debug, Default)]
pub struct MockDownloader {
    responses: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub async fn add_response(&self, url: &str, bytes: Vec<u8>) {
        self.responses.write().await.insert(url.to_string(), bytes);
    }

    /// URLs requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl TorrentDownloader for MockDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.write().await.push(url.to_string());
        self.responses
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Download {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }
}
