//! End-to-end cross-seed runs against mock services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossgrab_core::config::{
    Config, HistoryConfig, IndexerConfig, LoggingConfig, SearchConfig,
};
use crossgrab_core::fetcher::{Fetcher, ShortcutStyle};
use crossgrab_core::history::HistoryStore;
use crossgrab_core::orchestrator::{Orchestrator, OrchestratorError, PathOutcome};
use crossgrab_core::release::HeuristicNameParser;
use crossgrab_core::searcher::{SearchError, CATEGORY_MOVIES};
use crossgrab_core::testing::fixtures::{self, SAMPLE_TORRENT, SAMPLE_TORRENT_INFO_HASH};
use crossgrab_core::testing::{MockDownloader, MockSearcher, MockTorrentClient};
use crossgrab_core::torrent_client::{TorrentClient, TorrentClientError};
use tempfile::TempDir;

const MOVIE: &str = "Movie.Name.2020.1080p.BluRay.x264-GRP.mkv";
const LOCAL_SIZE: u64 = 1_000_000_000;

struct Harness {
    _dir: TempDir,
    media: PathBuf,
    save: PathBuf,
    history: PathBuf,
    searcher: Arc<MockSearcher>,
    downloader: Arc<MockDownloader>,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join("media");
        let save = dir.path().join("torrents");
        std::fs::create_dir(&media).unwrap();
        std::fs::create_dir(&save).unwrap();

        Self {
            media,
            save,
            history: dir.path().join("SearchHistory.json"),
            searcher: Arc::new(MockSearcher::new()),
            downloader: Arc::new(MockDownloader::new()),
            _dir: dir,
        }
    }

    /// Create a sparse media file of `size` bytes.
    fn add_media(&self, name: &str, size: u64) -> PathBuf {
        let path = self.media.join(name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(size).unwrap();
        path
    }

    fn config(&self, input_path: &Path, parse_dir: bool) -> Config {
        Config {
            input_path: input_path.to_path_buf(),
            parse_dir,
            save_path: self.save.clone(),
            indexer: IndexerConfig {
                url: "http://localhost:9117".to_string(),
                api_key: "key".to_string(),
                trackers: vec![],
                timeout_secs: 30,
            },
            search: SearchConfig {
                delay_secs: 0,
                retry_delay_secs: Some(0),
                ..SearchConfig::default()
            },
            torrent_client: None,
            history: HistoryConfig {
                path: self.history.clone(),
            },
            logging: LoggingConfig::default(),
            shortcut_style: Some(ShortcutStyle::DesktopEntry),
        }
    }

    fn orchestrator(
        &self,
        config: Config,
        torrent_client: Option<Arc<dyn TorrentClient>>,
    ) -> Orchestrator {
        let fetcher = Fetcher::new(
            self.downloader.clone(),
            &self.save,
            ShortcutStyle::DesktopEntry,
        );
        Orchestrator::new(
            config,
            self.searcher.clone(),
            torrent_client,
            fetcher,
            Arc::new(HeuristicNameParser::new()),
            HistoryStore::open(&self.history).unwrap(),
        )
    }

    fn saved_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.save)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[tokio::test]
async fn test_blutopia_gets_doubled_size_tolerance() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .set_results(vec![
            fixtures::raw_result("Blutopia", "Movie.Name.2020.1080p.BluRay.x264-GRP", 1_000_000_500),
            fixtures::raw_result("Other", "Movie.Name.2020.1080p.BluRay.x264-GRP", 1_010_000_000),
        ])
        .await;
    harness
        .downloader
        .add_response("https://blutopia.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;

    let mut orchestrator = harness.orchestrator(harness.config(&movie, false), None);
    let summary = orchestrator.run().await.unwrap();

    let searches = harness.searcher.recorded_searches().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query, "Movie Name 2020");
    assert_eq!(searches[0].category, CATEGORY_MOVIES);

    assert_eq!(summary.matched(), 1);
    assert_eq!(
        harness.saved_files(),
        vec!["[Blutopia] Movie.Name.2020.1080p.BluRay.x264-GRP.torrent".to_string()]
    );
    assert_eq!(
        harness.downloader.requests().await,
        vec!["https://blutopia.org/dl/1".to_string()]
    );

    let history = orchestrator.history().history();
    assert!(history.was_grabbed("blutopia", "https://blutopia.org/torrents/1"));
    assert!(history.was_searched(MOVIE));
}

#[tokio::test]
async fn test_only_dupes_skips_singleton_match() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .set_results(vec![fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE)])
        .await;
    harness
        .downloader
        .add_response("https://other.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;

    let mut config = harness.config(&movie, false);
    config.search.only_dupes = true;
    let summary = harness.orchestrator(config, None).run().await.unwrap();

    assert_eq!(summary.matched(), 1);
    assert!(summary.fetched().is_empty());
    assert!(harness.downloader.requests().await.is_empty());
    assert!(harness.saved_files().is_empty());
}

#[tokio::test]
async fn test_second_run_fetches_nothing_new() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .set_results(vec![fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE)])
        .await;
    harness
        .downloader
        .add_response("https://other.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;

    let first = harness
        .orchestrator(harness.config(&movie, false), None)
        .run()
        .await
        .unwrap();
    assert_eq!(first.fetched().len(), 1);

    // Same torrent, served through another proxy domain of the tracker.
    let mut proxied = fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE);
    proxied.details = Some("https://proxy9001.other.org/torrents/1".to_string());
    proxied.link = Some("https://proxy9001.other.org/dl/1".to_string());
    harness.searcher.set_results(vec![proxied]).await;

    let second = harness
        .orchestrator(harness.config(&movie, false), None)
        .run()
        .await
        .unwrap();

    assert!(second.fetched().is_empty());
    assert_eq!(harness.downloader.requests().await.len(), 1);
    assert_eq!(harness.saved_files().len(), 1);
}

#[tokio::test]
async fn test_parse_dir_skips_previously_searched_basenames() {
    let harness = Harness::new();
    harness.add_media(MOVIE, LOCAL_SIZE);

    harness
        .orchestrator(harness.config(&harness.media, true), None)
        .run()
        .await
        .unwrap();
    assert_eq!(harness.searcher.search_count().await, 1);

    let summary = harness
        .orchestrator(harness.config(&harness.media, true), None)
        .run()
        .await
        .unwrap();
    assert_eq!(harness.searcher.search_count().await, 1);
    assert_eq!(summary.outcomes[0].1, PathOutcome::SkippedAlreadySearched);

    let mut config = harness.config(&harness.media, true);
    config.search.ignore_history = true;
    harness.orchestrator(config, None).run().await.unwrap();
    assert_eq!(harness.searcher.search_count().await, 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_unknown_size_never_searches() {
    let harness = Harness::new();
    let broken = harness.media.join(MOVIE);
    std::os::unix::fs::symlink(harness.media.join("missing.mkv"), &broken).unwrap();

    let summary = harness
        .orchestrator(harness.config(&broken, false), None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.outcomes[0].1, PathOutcome::SkippedNoSize);
    assert_eq!(harness.searcher.search_count().await, 0);
}

#[tokio::test]
async fn test_unknown_title_never_searches() {
    let harness = Harness::new();
    let file = harness.add_media("1080p.mkv", 10);

    let summary = harness
        .orchestrator(harness.config(&file, false), None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.outcomes[0].1, PathOutcome::SkippedNoTitle);
    assert_eq!(harness.searcher.search_count().await, 0);
}

#[tokio::test]
async fn test_zero_indexers_aborts_run() {
    let harness = Harness::new();
    harness.add_media("Movie.One.2019-GRP.mkv", 100);
    harness.add_media("Movie.Two.2020-GRP.mkv", 100);
    harness.searcher.set_indexers(vec![]).await;

    let result = harness
        .orchestrator(harness.config(&harness.media, true), None)
        .run()
        .await;

    assert!(matches!(result, Err(OrchestratorError::NoValidIndexers)));
    assert_eq!(harness.searcher.search_count().await, 1);
}

#[tokio::test]
async fn test_transient_error_is_retried_once() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .set_results(vec![fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE)])
        .await;
    harness
        .downloader
        .add_response("https://other.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;
    harness.searcher.push_error(SearchError::Timeout).await;

    let summary = harness
        .orchestrator(harness.config(&movie, false), None)
        .run()
        .await
        .unwrap();

    assert_eq!(harness.searcher.search_count().await, 2);
    assert_eq!(summary.fetched().len(), 1);
}

#[tokio::test]
async fn test_failed_retry_skips_path_and_continues() {
    let harness = Harness::new();
    harness.add_media("Movie.One.2019-GRP.mkv", 100);
    harness.add_media("Movie.Two.2020-GRP.mkv", 100);
    harness
        .searcher
        .push_error(SearchError::ConnectionFailed("refused".to_string()))
        .await;
    harness
        .searcher
        .push_error(SearchError::ConnectionFailed("refused".to_string()))
        .await;

    let mut orchestrator = harness.orchestrator(harness.config(&harness.media, true), None);
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(harness.searcher.search_count().await, 3);
    assert_eq!(summary.outcomes[0].1, PathOutcome::SearchFailed);
    assert!(matches!(summary.outcomes[1].1, PathOutcome::Searched { .. }));

    let history = orchestrator.history().history();
    assert!(!history.was_searched("Movie.One.2019-GRP.mkv"));
    assert!(history.was_searched("Movie.Two.2020-GRP.mkv"));
}

#[tokio::test]
async fn test_malformed_response_is_not_retried() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .push_error(SearchError::MalformedResponse {
            reason: "expected value".to_string(),
            body: "<html>".to_string(),
        })
        .await;

    let summary = harness
        .orchestrator(harness.config(&movie, false), None)
        .run()
        .await
        .unwrap();

    assert_eq!(harness.searcher.search_count().await, 1);
    assert_eq!(summary.outcomes[0].1, PathOutcome::SearchFailed);
}

#[tokio::test]
async fn test_downloaded_torrent_already_in_client_is_discarded() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .set_results(vec![fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE)])
        .await;
    harness
        .downloader
        .add_response("https://other.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;
    let client = Arc::new(MockTorrentClient::with_hashes([SAMPLE_TORRENT_INFO_HASH]));

    let mut orchestrator = harness.orchestrator(harness.config(&movie, false), Some(client.clone()));
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(client.hash_fetch_count(), 1);
    assert_eq!(harness.downloader.requests().await.len(), 1);
    assert!(summary.fetched().is_empty());
    assert!(harness.saved_files().is_empty());
    assert!(orchestrator
        .history()
        .history()
        .was_grabbed("other", "https://other.org/torrents/1"));
}

#[tokio::test]
async fn test_indexer_hash_in_client_skips_download() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    let mut result = fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE);
    result.info_hash = Some(SAMPLE_TORRENT_INFO_HASH.to_lowercase());
    harness.searcher.set_results(vec![result]).await;
    let client = Arc::new(MockTorrentClient::with_hashes([SAMPLE_TORRENT_INFO_HASH]));

    let summary = harness
        .orchestrator(harness.config(&movie, false), Some(client))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.matched(), 1);
    assert!(harness.downloader.requests().await.is_empty());
}

#[tokio::test]
async fn test_client_failure_aborts_before_searching() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    let client = Arc::new(MockTorrentClient::new());
    client
        .set_next_error(TorrentClientError::ConnectionFailed("refused".to_string()))
        .await;

    let result = harness
        .orchestrator(harness.config(&movie, false), Some(client))
        .run()
        .await;

    assert!(matches!(result, Err(OrchestratorError::TorrentClient(_))));
    assert_eq!(harness.searcher.search_count().await, 0);
}

#[tokio::test]
async fn test_magnet_and_linkless_results() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    let mut magnet = fixtures::raw_result("Magnetic", "Movie.Name.2020", LOCAL_SIZE);
    magnet.link = Some(format!("magnet:?xt=urn:btih:{}", SAMPLE_TORRENT_INFO_HASH));
    let mut linkless = fixtures::raw_result("Blutopia", "Movie.Name.2020", LOCAL_SIZE);
    linkless.link = None;
    harness.searcher.set_results(vec![magnet, linkless]).await;

    let mut orchestrator = harness.orchestrator(harness.config(&movie, false), None);
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.matched(), 2);
    assert_eq!(
        harness.saved_files(),
        vec!["[Magnetic] Movie.Name.2020.desktop".to_string()]
    );
    assert!(harness.downloader.requests().await.is_empty());

    let history = orchestrator.history().history();
    assert!(history.was_grabbed("magnetic", "https://magnetic.org/torrents/1"));
    assert!(!history.was_grabbed("blutopia", "https://blutopia.org/torrents/1"));
}

#[tokio::test]
async fn test_history_is_persisted_after_each_path() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    harness
        .searcher
        .set_results(vec![fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE)])
        .await;
    harness
        .downloader
        .add_response("https://other.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;

    harness
        .orchestrator(harness.config(&movie, false), None)
        .run()
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&harness.history).unwrap()).unwrap();
    assert_eq!(json["basenamesSearched"][0], MOVIE);
    assert_eq!(json["downloadHistory"]["other"][0], "/torrents/1");
}

#[tokio::test]
async fn test_failing_indexer_does_not_stop_matching() {
    let harness = Harness::new();
    let movie = harness.add_media(MOVIE, LOCAL_SIZE);
    let mut broken = fixtures::indexer("Flaky");
    broken.results = 0;
    broken.error = Some("Cloudflare challenge".to_string());
    harness
        .searcher
        .set_indexers(vec![fixtures::indexer("Other"), broken])
        .await;
    harness
        .searcher
        .set_results(vec![fixtures::raw_result("Other", "Movie.Name.2020", LOCAL_SIZE)])
        .await;
    harness
        .downloader
        .add_response("https://other.org/dl/1", SAMPLE_TORRENT.to_vec())
        .await;

    let summary = harness
        .orchestrator(harness.config(&movie, false), None)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.fetched().len(), 1);
    assert_eq!(summary.search_failures(), 0);
}
