//! Jackett search backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::IndexerConfig;

use super::{IndexerSummary, RawSearchResult, SearchError, SearchRequest, SearchResponse, Searcher};

/// Jackett search backend implementation.
pub struct JackettSearcher {
    client: Client,
    config: IndexerConfig,
}

impl JackettSearcher {
    /// Create a new JackettSearcher with the given configuration.
    pub fn new(config: IndexerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Build the Jackett API URL for a search across all indexers.
    fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/all/results?apikey={}&Query={}",
            self.base_url(),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&request.query)
        );

        for tracker in &request.trackers {
            url.push_str(&format!("&Tracker[]={}", urlencoding::encode(tracker)));
        }
        url.push_str(&format!("&Category[]={}", request.category));
        if let Some(season) = request.season {
            url.push_str(&format!("&season={}", season));
        }
        if let Some(episode) = request.episode {
            url.push_str(&format!("&episode={}", episode));
        }

        url
    }

    /// Request URL with the API key masked, for logs.
    fn redacted(&self, url: &str) -> String {
        url.replace(
            &format!("apikey={}", urlencoding::encode(&self.config.api_key)),
            "apikey=REDACTED",
        )
    }
}

fn map_request_error(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else if e.is_connect() {
        SearchError::ConnectionFailed(e.to_string())
    } else {
        SearchError::ApiError(e.to_string())
    }
}

#[async_trait]
impl Searcher for JackettSearcher {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn probe(&self) -> Result<(), SearchError> {
        self.client
            .head(self.base_url())
            .send()
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let url = self.build_search_url(request);
        debug!(url = %self.redacted(&url), "Searching Jackett");

        let response = self.client.get(&url).send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await.map_err(map_request_error)?;
        parse_response(&body)
    }
}

/// Decode a Jackett results document.
fn parse_response(body: &str) -> Result<SearchResponse, SearchError> {
    let jackett_response: JackettResponse =
        serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse {
            reason: e.to_string(),
            body: body.to_string(),
        })?;

    let indexers = jackett_response
        .Indexers
        .ok_or_else(|| SearchError::MalformedResponse {
            reason: "missing Indexers".to_string(),
            body: body.to_string(),
        })?;
    if indexers.is_empty() {
        return Err(SearchError::NoValidIndexers);
    }

    debug!(
        indexers = indexers.len(),
        results = jackett_response.Results.len(),
        "Jackett search complete"
    );

    Ok(SearchResponse {
        results: jackett_response.Results,
        indexers: indexers
            .into_iter()
            .map(|i| IndexerSummary {
                id: i.ID.unwrap_or_default(),
                name: i.Name.unwrap_or_default(),
                results: i.Results.unwrap_or(0),
                error: i.Error,
            })
            .collect(),
    })
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    #[serde(default)]
    Results: Vec<RawSearchResult>,
    #[serde(default)]
    Indexers: Option<Vec<JackettIndexer>>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettIndexer {
    #[serde(default)]
    ID: Option<String>,
    #[serde(default)]
    Name: Option<String>,
    #[serde(default)]
    Results: Option<u64>,
    #[serde(default)]
    Error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::{CATEGORY_MOVIES, CATEGORY_TV};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn searcher(url: &str) -> JackettSearcher {
        searcher_with_timeout(url, 30)
    }

    fn searcher_with_timeout(url: &str, timeout_secs: u32) -> JackettSearcher {
        JackettSearcher::new(IndexerConfig {
            url: url.to_string(),
            api_key: "test-key".to_string(),
            trackers: vec![],
            timeout_secs,
        })
    }

    /// Answer a single HTTP request with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        url
    }

    /// URL of a local port with nothing listening.
    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    fn movie_request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            category: CATEGORY_MOVIES,
            season: None,
            episode: None,
            trackers: vec![],
        }
    }

    #[test]
    fn test_build_search_url() {
        let url = searcher("http://localhost:9117").build_search_url(&movie_request("test query"));
        assert!(url.starts_with("http://localhost:9117/api/v2.0/indexers/all/results?"));
        assert!(url.contains("apikey=test-key"));
        assert!(url.contains("Query=test%20query"));
        assert!(url.contains("Category[]=2000"));
        assert!(!url.contains("Tracker[]"));
        assert!(!url.contains("season="));
    }

    #[test]
    fn test_build_search_url_with_trackers_and_episode() {
        let request = SearchRequest {
            query: "Show Name".to_string(),
            category: CATEGORY_TV,
            season: Some(1),
            episode: Some(2),
            trackers: vec!["blutopia".to_string(), "other tracker".to_string()],
        };
        let url = searcher("http://localhost:9117/").build_search_url(&request);
        assert!(url.starts_with("http://localhost:9117/api/v2.0/"));
        assert!(url.contains("&Tracker[]=blutopia"));
        assert!(url.contains("&Tracker[]=other%20tracker"));
        assert!(url.contains("&Category[]=5000"));
        assert!(url.contains("&season=1"));
        assert!(url.contains("&episode=2"));
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let searcher = searcher("http://localhost:9117");
        let url = searcher.build_search_url(&movie_request("x"));
        let redacted = searcher.redacted(&url);
        assert!(!redacted.contains("test-key"));
        assert!(redacted.contains("apikey=REDACTED"));
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "Results": [
                {"Tracker": "Other", "TrackerId": "other", "Title": "A", "Size": 10,
                 "Details": "https://other.org/1", "Link": "https://other.org/dl/1"}
            ],
            "Indexers": [{"ID": "other", "Name": "Other", "Status": 2, "Results": 1, "Error": null}]
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].tracker.as_deref(), Some("Other"));
        assert_eq!(response.indexers.len(), 1);
        assert_eq!(response.indexers[0].id, "other");
        assert_eq!(response.indexers[0].results, 1);
    }

    #[test]
    fn test_parse_response_zero_indexers() {
        let body = r#"{"Results": [], "Indexers": []}"#;
        assert!(matches!(
            parse_response(body),
            Err(SearchError::NoValidIndexers)
        ));
    }

    #[test]
    fn test_parse_response_malformed_keeps_body() {
        let body = "<html>502 Bad Gateway</html>";
        match parse_response(body) {
            Err(SearchError::MalformedResponse { body: kept, .. }) => assert_eq!(kept, body),
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_missing_indexers_is_malformed() {
        assert!(matches!(
            parse_response(r#"{"Results": []}"#),
            Err(SearchError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_parse_response_null_category() {
        let body = r#"{
            "Results": [
                {"Tracker": "Other", "Title": "A", "Size": 10, "Category": null},
                {"Tracker": "Other", "Title": "B", "Size": 20, "Category": [2000, 2040]}
            ],
            "Indexers": [{"ID": "other", "Name": "Other", "Results": 2}]
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.results.len(), 2);
        assert!(response.results[0].category.is_empty());
        assert_eq!(response.results[1].category, vec![2000, 2040]);
    }

    #[test]
    fn test_parse_response_keeps_indexer_errors() {
        let body = r#"{
            "Results": [],
            "Indexers": [
                {"ID": "other", "Name": "Other", "Results": 0, "Error": "Cloudflare challenge"}
            ]
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.indexers[0].error.as_deref(), Some("Cloudflare challenge"));
    }

    #[tokio::test]
    async fn test_search_closed_port_is_connection_failure() {
        let url = closed_port_url().await;
        let error = searcher(&url).search(&movie_request("x")).await.unwrap_err();
        assert!(matches!(error, SearchError::ConnectionFailed(_)), "{:?}", error);
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_search_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let error = searcher_with_timeout(&url, 1)
            .search(&movie_request("x"))
            .await
            .unwrap_err();
        assert!(matches!(error, SearchError::Timeout), "{:?}", error);
        assert!(error.is_transient());
        server.abort();
    }

    #[tokio::test]
    async fn test_search_non_json_body_is_malformed() {
        let url = serve_once("200 OK", "<html>Jackett is starting</html>").await;
        match searcher(&url).search(&movie_request("x")).await {
            Err(SearchError::MalformedResponse { body, .. }) => {
                assert_eq!(body, "<html>Jackett is starting</html>")
            }
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_zero_indexers_over_http() {
        let url = serve_once("200 OK", r#"{"Results":[],"Indexers":[]}"#).await;
        let error = searcher(&url).search(&movie_request("x")).await.unwrap_err();
        assert!(matches!(error, SearchError::NoValidIndexers), "{:?}", error);
        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn test_search_http_error_status() {
        let url = serve_once("401 Unauthorized", "bad key").await;
        let error = searcher(&url).search(&movie_request("x")).await.unwrap_err();
        assert!(matches!(error, SearchError::ApiError(_)), "{:?}", error);
        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn test_search_success_over_http() {
        let url = serve_once(
            "200 OK",
            r#"{"Results":[{"Tracker":"Other","Title":"A","Size":10}],"Indexers":[{"ID":"other","Name":"Other","Results":1}]}"#,
        )
        .await;
        let response = searcher(&url).search(&movie_request("x")).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.indexers[0].name, "Other");
    }

    #[tokio::test]
    async fn test_probe() {
        let url = serve_once("200 OK", "").await;
        assert!(searcher(&url).probe().await.is_ok());

        let url = closed_port_url().await;
        assert!(matches!(
            searcher(&url).probe().await,
            Err(SearchError::ConnectionFailed(_))
        ));
    }
}
