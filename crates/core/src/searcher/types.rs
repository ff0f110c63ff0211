//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Torznab category code for movies.
pub const CATEGORY_MOVIES: u32 = 2000;
/// Torznab category code for TV.
pub const CATEGORY_TV: u32 = 5000;

/// Parameters for one indexer search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search query.
    pub query: String,
    /// Torznab category code.
    pub category: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Tracker allow-list. Empty searches every configured tracker.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trackers: Vec<String>,
}

/// Raw result as returned by the indexer aggregator.
///
/// Only the fields used downstream are kept; everything else in the
/// response is dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSearchResult {
    #[serde(default)]
    pub tracker: Option<String>,
    #[serde(default)]
    pub tracker_id: Option<String>,
    #[serde(default)]
    pub category_desc: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Vec<u32>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub imdb: Option<u64>,
    #[serde(default)]
    pub info_hash: Option<String>,
}

/// Read an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A trimmed, normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display name of the source tracker.
    pub tracker: String,
    /// Stable per-tracker key used in grab history.
    pub tracker_id: String,
    /// Title with any trailing `[... / ...]` annotation removed.
    pub title: String,
    /// Download URL: a magnet URI or an HTTP .torrent URL.
    pub link: Option<String>,
    /// Canonical web page of the result.
    pub details_url: String,
    pub size_bytes: Option<u64>,
    /// Uppercase hex info hash, when the indexer provides one.
    pub info_hash: Option<String>,
    pub category: Vec<u32>,
    pub category_description: Option<String>,
    pub imdb_id: Option<u64>,
}

impl SearchResult {
    pub fn is_magnet(&self) -> bool {
        self.link
            .as_deref()
            .is_some_and(|link| link.starts_with("magnet:?xt="))
    }
}

/// Summary of one indexer that took part in a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerSummary {
    pub id: String,
    pub name: String,
    pub results: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Successful search response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<RawSearchResult>,
    pub indexers: Vec<IndexerSummary>,
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Malformed search response: {reason}")]
    MalformedResponse { reason: String, body: String },

    /// The aggregator searched no indexers at all, which means the tracker
    /// allow-list names nothing it knows about.
    #[error("No valid indexers were searched")]
    NoValidIndexers,
}

impl SearchError {
    /// Errors worth one retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, SearchError::Timeout | SearchError::ConnectionFailed(_))
    }
}

/// Trait for torrent search backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Check that the backend is reachable.
    async fn probe(&self) -> Result<(), SearchError>;

    /// Run one search.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError>;
}
