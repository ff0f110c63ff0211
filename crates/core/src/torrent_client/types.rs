//! Types for torrent client operations.

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid client URL: {0}")]
    InvalidUrl(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Read-only view of a running torrent client.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Liveness probe: list the RPC methods the client exposes.
    async fn list_methods(&self) -> Result<Vec<String>, TorrentClientError>;

    /// Uppercase info hashes of every torrent currently loaded.
    async fn list_info_hashes(&self) -> Result<HashSet<String>, TorrentClientError>;
}
