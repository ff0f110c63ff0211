//! Sequential cross-seed run over the configured input paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::grab::{decide, GrabDecision, GrabPolicy};
use crate::history::HistoryStore;
use crate::release::{build_release, LocalRelease, NameParser};
use crate::searcher::{
    build_request, match_results, SearchError, SearchRequest, SearchResponse, SearchResult,
    Searcher, SizeTolerance,
};
use crate::torrent_client::TorrentClient;

use super::types::{OrchestratorError, PathOutcome, RunSummary};

/// Paths to process: the input itself, or its sorted entries with `parse_dir`.
pub fn collect_input_paths(config: &Config) -> Result<Vec<PathBuf>, OrchestratorError> {
    if !config.parse_dir {
        return Ok(vec![config.input_path.clone()]);
    }

    let input_error = |source| OrchestratorError::Input {
        path: config.input_path.clone(),
        source,
    };
    let mut paths = std::fs::read_dir(&config.input_path)
        .map_err(input_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(input_error)?;
    paths.sort();
    Ok(paths)
}

/// Drives releases through search, matching, grab decisions and fetching.
pub struct Orchestrator {
    config: Config,
    searcher: Arc<dyn Searcher>,
    torrent_client: Option<Arc<dyn TorrentClient>>,
    fetcher: Fetcher,
    parser: Arc<dyn NameParser>,
    history: HistoryStore,
    tolerance: SizeTolerance,
    policy: GrabPolicy,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        searcher: Arc<dyn Searcher>,
        torrent_client: Option<Arc<dyn TorrentClient>>,
        fetcher: Fetcher,
        parser: Arc<dyn NameParser>,
        history: HistoryStore,
    ) -> Self {
        let tolerance = SizeTolerance::from_config(&config.search);
        let policy = GrabPolicy::from_config(&config.search);

        Self {
            config,
            searcher,
            torrent_client,
            fetcher,
            parser,
            history,
            tolerance,
            policy,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Process every input path once.
    ///
    /// Per-path failures are logged and recorded in the summary. Only
    /// conditions that would fail every later path abort the run.
    pub async fn run(&mut self) -> Result<RunSummary, OrchestratorError> {
        let paths = collect_input_paths(&self.config)?;
        let existing_hashes = self.fetch_existing_hashes().await?;

        let mut summary = RunSummary::default();
        for (index, path) in paths.iter().enumerate() {
            let outcome = self
                .process_path(path, index, paths.len(), &existing_hashes)
                .await?;
            self.history.save()?;

            let issued_search = outcome.issued_search();
            summary.outcomes.push((path.clone(), outcome));

            if issued_search && index + 1 < paths.len() {
                self.pause(self.config.search.delay_secs).await;
            }
        }

        info!(
            paths = summary.outcomes.len(),
            "Done: {} searched, {} matched, {} fetched, {} skipped, {} failed searches",
            summary.searched(),
            summary.matched(),
            summary.fetched().len(),
            summary.skipped(),
            summary.search_failures()
        );
        Ok(summary)
    }

    async fn fetch_existing_hashes(&self) -> Result<HashSet<String>, OrchestratorError> {
        let Some(client) = &self.torrent_client else {
            return Ok(HashSet::new());
        };

        info!("Fetching torrent list from {} client", client.name());
        let hashes = client.list_info_hashes().await?;
        info!("Found {} existing torrents", hashes.len());
        Ok(hashes)
    }

    async fn process_path(
        &mut self,
        path: &Path,
        index: usize,
        total: usize,
        existing_hashes: &HashSet<String>,
    ) -> Result<PathOutcome, OrchestratorError> {
        let release = match build_release(path, self.parser.as_ref()) {
            Ok(release) => release,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable path");
                return Ok(PathOutcome::SkippedUnreadable);
            }
        };

        let Some(title) = release.title() else {
            info!("Skipping file. Could not get title from filename: {}", release.basename);
            return Ok(PathOutcome::SkippedNoTitle);
        };

        info!(
            "Searching for {} of {}: {}{}{}",
            index + 1,
            total,
            title,
            release
                .parsed
                .year
                .map(|year| format!(" {}", year))
                .unwrap_or_default(),
            match (&release.release_group, self.config.search.match_release_group) {
                (Some(group), true) => format!(" (release group: {})", group),
                _ => String::new(),
            }
        );
        debug!(basename = %release.basename, parsed = ?release.parsed, size = ?release.size_bytes, "Local release");

        if self.config.parse_dir
            && !self.config.search.ignore_history
            && self.history.history().was_searched(&release.basename)
        {
            info!("Skipping search. File previously searched: {}", release.basename);
            return Ok(PathOutcome::SkippedAlreadySearched);
        }

        if release.size_bytes.is_none() {
            info!("Skipping. Could not get proper filesize data");
            return Ok(PathOutcome::SkippedNoSize);
        }

        let Some(request) = build_request(
            &release,
            &self.config.indexer.trackers,
            self.config.search.match_release_group,
        ) else {
            info!(
                "Skipping. Unsupported content type {:?} for {}",
                release.parsed.content_type, release.basename
            );
            return Ok(PathOutcome::SkippedUnsupportedType);
        };

        let response = match self.search_with_retry(&request).await {
            Ok(response) => response,
            Err(SearchError::NoValidIndexers) => return Err(OrchestratorError::NoValidIndexers),
            Err(e) => {
                warn!("Search failed for {}: {}", release.basename, e);
                if let SearchError::MalformedResponse { body, .. } = &e {
                    debug!(body = %body, "Malformed search response body");
                }
                return Ok(PathOutcome::SearchFailed);
            }
        };

        self.history.history_mut().mark_searched(&release.basename);

        for indexer in &response.indexers {
            match &indexer.error {
                Some(error) => warn!("Indexer {} failed: {}", indexer.name, error),
                None => debug!(indexer = %indexer.id, results = indexer.results, "Indexer answered"),
            }
        }

        let total_results = response.results.len();
        let matches = match_results(&release, response.results, &self.tolerance);
        info!("{} matched of {} results.", matches.len(), total_results);

        let fetched = self.grab_matches(&release, &matches, existing_hashes).await;

        Ok(PathOutcome::Searched {
            total: total_results,
            matched: matches.len(),
            fetched,
        })
    }

    /// One search, retried once after `retry_delay_secs` on transient errors.
    async fn search_with_retry(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        match self.searcher.search(request).await {
            Err(e) if e.is_transient() => {
                info!("{}. Retrying once more.", e);
                self.pause(self.config.search.retry_delay_secs()).await;
                self.searcher.search(request).await
            }
            other => other,
        }
    }

    async fn grab_matches(
        &mut self,
        release: &LocalRelease,
        matches: &[SearchResult],
        existing_hashes: &HashSet<String>,
    ) -> Vec<PathBuf> {
        let mut fetched = Vec::new();

        for result in matches {
            let decision = decide(
                result,
                self.history.history(),
                existing_hashes,
                &self.policy,
                matches.len(),
            );
            debug!(
                tracker = %result.tracker,
                title = %result.title,
                details = %result.details_url,
                decision = ?decision,
                "Grab decision"
            );

            if decision != GrabDecision::Fetch {
                info!("- Skipping [{}] {}: {}", result.tracker, result.title, decision);
                continue;
            }

            if result.info_hash.is_none() && !result.is_magnet() {
                info!(
                    "- [{}] {} has no info hash, downloading torrent to check it locally",
                    result.tracker, result.title
                );
            }
            info!("- Grabbing release: [{}] {}", result.tracker, result.title);

            match self.fetcher.fetch(result, existing_hashes).await {
                Ok(FetchOutcome::Written(path)) => {
                    self.history
                        .history_mut()
                        .record_grab(&result.tracker_id, &result.details_url);
                    debug!(path = %path.display(), "Wrote descriptor");
                    fetched.push(path);
                }
                Ok(FetchOutcome::SkippedDuplicateHash(hash)) => {
                    self.history
                        .history_mut()
                        .record_grab(&result.tracker_id, &result.details_url);
                    info!(
                        "- Skipping [{}] {}: info hash {} is already in the torrent client",
                        result.tracker, result.title, hash
                    );
                }
                Ok(FetchOutcome::SkippedNoLink) => {
                    info!("- Skipping [{}] {}: no download link", result.tracker, result.title);
                }
                Err(e) => {
                    warn!(
                        "- Failed to fetch [{}] {} for {}: {}",
                        result.tracker, result.title, release.basename, e
                    );
                }
            }
        }

        fetched
    }

    async fn pause(&self, secs: u64) {
        if secs > 0 {
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }
}
