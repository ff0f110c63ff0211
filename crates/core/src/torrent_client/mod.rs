//! Torrent client abstraction.
//!
//! This module provides a read-only `TorrentClient` trait used to learn
//! which torrents are already loaded, with an rTorrent implementation over
//! XML-RPC on HTTP or SCGI.

mod rtorrent;
mod transport;
mod types;
pub mod xmlrpc;

pub use rtorrent::RtorrentClient;
pub use transport::{HttpTransport, ScgiTransport, XmlRpcTransport};
pub use types::*;

use std::sync::Arc;
use url::Url;

use crate::config::{TorrentClientBackend, TorrentClientConfig};

/// Build a client for `config`, picking the transport from the URL scheme.
pub fn create_torrent_client(
    config: &TorrentClientConfig,
) -> Result<Arc<dyn TorrentClient>, TorrentClientError> {
    let url = Url::parse(&config.url).map_err(|e| TorrentClientError::InvalidUrl(e.to_string()))?;

    match config.client_type {
        TorrentClientBackend::Rtorrent => match url.scheme() {
            "http" | "https" => Ok(Arc::new(RtorrentClient::new(HttpTransport::new(
                &config.url,
                config.timeout_secs,
            )))),
            "scgi" => Ok(Arc::new(RtorrentClient::new(ScgiTransport::from_url(
                &config.url,
                config.timeout_secs,
            )?))),
            other => Err(TorrentClientError::InvalidUrl(format!(
                "unsupported scheme '{}' for {}",
                other,
                config.client_type.as_str()
            ))),
        },
    }
}
