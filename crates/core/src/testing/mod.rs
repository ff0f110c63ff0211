//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits
//! (indexer search, torrent client, HTTP download) so whole runs can be
//! tested without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use crossgrab_core::testing::{fixtures, MockDownloader, MockSearcher, MockTorrentClient};
//!
//! let searcher = MockSearcher::new();
//! let torrent_client = MockTorrentClient::with_hashes([fixtures::SAMPLE_TORRENT_INFO_HASH]);
//! let downloader = MockDownloader::new();
//!
//! searcher.set_results(vec![fixtures::raw_result("Other", "Movie.2020-GRP", 1_000)]).await;
//! downloader.add_response("https://other.org/dl/1", fixtures::SAMPLE_TORRENT.to_vec()).await;
//! ```

mod mock_downloader;
mod mock_searcher;
mod mock_torrent_client;

pub use mock_downloader::MockDownloader;
pub use mock_searcher::MockSearcher;
pub use mock_torrent_client::MockTorrentClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::searcher::{IndexerSummary, RawSearchResult, SearchResult};

    /// A minimal single-file torrent.
    pub const SAMPLE_TORRENT: &[u8] = b"d8:announce19:http://tracker.test4:infod6:lengthi12e4:name8:test.txt12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";

    /// SHA-1 of the `info` dictionary of `SAMPLE_TORRENT`.
    pub const SAMPLE_TORRENT_INFO_HASH: &str = "A8F29E10B717F1D032BEC7711C15B49065A7BA0B";

    fn tracker_id(tracker: &str) -> String {
        tracker.to_lowercase().replace(' ', "")
    }

    /// Raw indexer hit with a torrent link and details page on
    /// `https://<tracker id>.org`.
    pub fn raw_result(tracker: &str, title: &str, size: u64) -> RawSearchResult {
        let id = tracker_id(tracker);
        RawSearchResult {
            tracker: Some(tracker.to_string()),
            tracker_id: Some(id.clone()),
            category_desc: Some("Movies/HD".to_string()),
            title: Some(title.to_string()),
            link: Some(format!("https://{}.org/dl/1", id)),
            details: Some(format!("https://{}.org/torrents/1", id)),
            category: vec![2000],
            size: Some(size),
            imdb: None,
            info_hash: None,
        }
    }

    /// Trimmed counterpart of `raw_result`.
    pub fn search_result(tracker: &str, title: &str, size: u64) -> SearchResult {
        let id = tracker_id(tracker);
        SearchResult {
            tracker: tracker.to_string(),
            tracker_id: id.clone(),
            title: title.to_string(),
            link: Some(format!("https://{}.org/dl/1", id)),
            details_url: format!("https://{}.org/torrents/1", id),
            size_bytes: Some(size),
            info_hash: None,
            category: vec![2000],
            category_description: Some("Movies/HD".to_string()),
            imdb_id: None,
        }
    }

    pub fn indexer(name: &str) -> IndexerSummary {
        IndexerSummary {
            id: tracker_id(name),
            name: name.to_string(),
            results: 1,
            error: None,
        }
    }
}
