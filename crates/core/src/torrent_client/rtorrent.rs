//! rTorrent client over XML-RPC.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

use super::xmlrpc::{decode_response, encode_call, Value};
use super::{TorrentClient, TorrentClientError, XmlRpcTransport};

/// rTorrent accessed through any XML-RPC transport.
pub struct RtorrentClient<T: XmlRpcTransport> {
    transport: T,
}

impl<T: XmlRpcTransport> RtorrentClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, TorrentClientError> {
        debug!(endpoint = %self.transport.endpoint(), method, "rTorrent XML-RPC call");
        let body = encode_call(method, params);
        let response = self.transport.send(&body).await?;
        decode_response(&response)
    }

    async fn call_for_strings(&self, method: &str) -> Result<Vec<String>, TorrentClientError> {
        let value = self.call(method, &[]).await?;
        let items = value.as_array().ok_or_else(|| {
            TorrentClientError::UnexpectedResponse(format!("{} did not return an array", method))
        })?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    TorrentClientError::UnexpectedResponse(format!(
                        "{} returned a non-string item",
                        method
                    ))
                })
            })
            .collect()
    }
}

#[async_trait]
impl<T: XmlRpcTransport> TorrentClient for RtorrentClient<T> {
    fn name(&self) -> &str {
        "rtorrent"
    }

    async fn list_methods(&self) -> Result<Vec<String>, TorrentClientError> {
        self.call_for_strings("system.listMethods").await
    }

    async fn list_info_hashes(&self) -> Result<HashSet<String>, TorrentClientError> {
        let hashes = self.call_for_strings("download_list").await?;
        Ok(hashes.into_iter().map(|hash| hash.to_uppercase()).collect())
    }
}
