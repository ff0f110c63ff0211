pub mod config;
pub mod fetcher;
pub mod grab;
pub mod history;
pub mod orchestrator;
pub mod release;
pub mod searcher;
pub mod testing;
pub mod torrent_client;

pub use config::{load_config, validate_config, Config, ConfigError, SanitizedConfig};
pub use fetcher::{Fetcher, FetchError, FetchOutcome, HttpDownloader, ShortcutStyle};
pub use grab::{decide, GrabDecision, GrabPolicy};
pub use history::{HistoryError, HistoryStore, SearchHistory};
pub use orchestrator::{Orchestrator, OrchestratorError, PathOutcome, RunSummary};
pub use release::{build_release, HeuristicNameParser, LocalRelease, NameParser};
pub use searcher::{JackettSearcher, SearchError, Searcher};
pub use torrent_client::{create_torrent_client, TorrentClient, TorrentClientError};
