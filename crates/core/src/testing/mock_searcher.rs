//! Mock searcher for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::searcher::{
    IndexerSummary, RawSearchResult, SearchError, SearchRequest, SearchResponse, Searcher,
};

/// Mock implementation of the Searcher trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track search requests for assertions
/// - Queue failures for upcoming searches
///
/// # Example
///
/// ```rust,ignore
/// use crossgrab_core::testing::{fixtures, MockSearcher};
///
/// let searcher = MockSearcher::new();
/// searcher
///     .set_results(vec![fixtures::raw_result("Blutopia", "Movie.2020-GRP", 1_000)])
///     .await;
/// // The first search times out, later ones return the result.
/// searcher.push_error(SearchError::Timeout).await;
/// ```
#[derive(Debug)]
pub struct MockSearcher {
    /// Results returned by every successful search.
    results: Arc<RwLock<Vec<RawSearchResult>>>,
    /// Indexers reported with each response. Empty yields `NoValidIndexers`.
    indexers: Arc<RwLock<Vec<IndexerSummary>>>,
    /// Errors returned by the next searches, in order.
    errors: Arc<RwLock<VecDeque<SearchError>>>,
    /// Recorded search requests.
    searches: Arc<RwLock<Vec<SearchRequest>>>,
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a mock searcher with no results and one healthy indexer.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            indexers: Arc::new(RwLock::new(vec![IndexerSummary {
                id: "mock-indexer".to_string(),
                name: "Mock Indexer".to_string(),
                results: 0,
                error: None,
            }])),
            errors: Arc::new(RwLock::new(VecDeque::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<RawSearchResult>) {
        *self.results.write().await = results;
    }

    /// Set the indexers reported with each response.
    pub async fn set_indexers(&self, indexers: Vec<IndexerSummary>) {
        *self.indexers.write().await = indexers;
    }

    /// Queue an error. Queued errors are returned by searches in order.
    pub async fn push_error(&self, error: SearchError) {
        self.errors.write().await.push_back(error);
    }

    /// Get recorded search requests.
    pub async fn recorded_searches(&self) -> Vec<SearchRequest> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self) -> Result<(), SearchError> {
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.searches.write().await.push(request.clone());

        if let Some(error) = self.errors.write().await.pop_front() {
            return Err(error);
        }

        let indexers = self.indexers.read().await.clone();
        if indexers.is_empty() {
            return Err(SearchError::NoValidIndexers);
        }

        Ok(SearchResponse {
            results: self.results.read().await.clone(),
            indexers,
        })
    }
}
