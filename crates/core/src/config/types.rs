use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::fetcher::ShortcutStyle;

/// 1 MiB in bytes.
pub const MIB: u64 = 1024 * 1024;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// File or directory to process.
    pub input_path: PathBuf,
    /// Treat every entry inside `input_path` as its own release.
    #[serde(default)]
    pub parse_dir: bool,
    /// Directory that receives fetched .torrent files and magnet shortcuts.
    pub save_path: PathBuf,
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub torrent_client: Option<TorrentClientConfig>,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Format of magnet shortcut files. Detected from the host when unset.
    #[serde(default)]
    pub shortcut_style: Option<ShortcutStyle>,
}

/// Indexer aggregator (Jackett) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// Tracker allow-list. Empty means all configured trackers.
    #[serde(default)]
    pub trackers: Vec<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Search and matching behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Append the extracted release group to the query.
    #[serde(default)]
    pub match_release_group: bool,
    /// Bypass both the "already searched" and "already grabbed" checks.
    #[serde(default)]
    pub ignore_history: bool,
    /// Require an exact size match.
    #[serde(default)]
    pub strict_size: bool,
    /// Skip fetching when a release has exactly one match.
    #[serde(default)]
    pub only_dupes: bool,
    /// Pause between processed paths, in seconds.
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
    /// Pause before retrying a failed search. Falls back to `delay_secs`.
    #[serde(default)]
    pub retry_delay_secs: Option<u64>,
    /// Lenient-mode size tolerance in bytes.
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance_bytes: u64,
    /// Tolerance multipliers for trackers with unreliable size reporting.
    #[serde(default = "default_tracker_multipliers")]
    pub tracker_size_multipliers: BTreeMap<String, u64>,
}

impl SearchConfig {
    pub fn retry_delay_secs(&self) -> u64 {
        self.retry_delay_secs.unwrap_or(self.delay_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            match_release_group: false,
            ignore_history: false,
            strict_size: false,
            only_dupes: false,
            delay_secs: default_delay(),
            retry_delay_secs: None,
            size_tolerance_bytes: default_size_tolerance(),
            tracker_size_multipliers: default_tracker_multipliers(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

fn default_delay() -> u64 {
    10
}

fn default_size_tolerance() -> u64 {
    5 * MIB
}

fn default_tracker_multipliers() -> BTreeMap<String, u64> {
    // Older Blutopia uploads report sizes that are slightly off.
    BTreeMap::from([("Blutopia".to_string(), 2)])
}

/// Torrent client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentClientConfig {
    pub client_type: TorrentClientBackend,
    /// `http(s)://...`, `scgi://host:port` or `scgi:///path/to/socket`
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Available torrent client backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TorrentClientBackend {
    Rtorrent,
}

impl TorrentClientBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentClientBackend::Rtorrent => "rtorrent",
        }
    }
}

/// Search history persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("SearchHistory.json")
}

/// Log file location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("crossgrab.log")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub input_path: PathBuf,
    pub parse_dir: bool,
    pub save_path: PathBuf,
    pub indexer: SanitizedIndexerConfig,
    pub search: SearchConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_client: Option<TorrentClientConfig>,
    pub history: HistoryConfig,
}

/// Sanitized indexer config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIndexerConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub trackers: Vec<String>,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            input_path: config.input_path.clone(),
            parse_dir: config.parse_dir,
            save_path: config.save_path.clone(),
            indexer: SanitizedIndexerConfig {
                url: config.indexer.url.clone(),
                api_key_configured: !config.indexer.api_key.is_empty(),
                trackers: config.indexer.trackers.clone(),
                timeout_secs: config.indexer.timeout_secs,
            },
            search: config.search.clone(),
            torrent_client: config.torrent_client.clone(),
            history: config.history.clone(),
        }
    }
}
