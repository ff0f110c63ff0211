//! Command-line flags.
//!
//! Every flag is optional at parse time so values can also come from the
//! config file or `CROSSGRAB_*` environment variables. Flags that were given
//! override both.

use std::path::PathBuf;

use clap::Parser;
use serde_json::{json, Map, Value};

#[derive(Parser, Debug)]
#[command(name = "crossgrab")]
#[command(version, about = "Find and fetch cross-seedable torrents for local media")]
pub struct Args {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// File or directory to process
    #[arg(short, long)]
    pub input_path: Option<PathBuf>,

    /// Treat each entry inside the input path as its own release
    #[arg(long)]
    pub parse_dir: bool,

    /// Directory that receives fetched .torrent files
    #[arg(short, long)]
    pub save_path: Option<PathBuf>,

    /// Jackett server URL, e.g. http://localhost:9117
    #[arg(long)]
    pub indexer_url: Option<String>,

    /// Jackett API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Comma-separated tracker names to search. Searches all when omitted.
    #[arg(long, value_delimiter = ',')]
    pub trackers: Option<Vec<String>>,

    /// Include the release group in the search query
    #[arg(long)]
    pub match_release_group: bool,

    /// Seconds to wait between searched paths
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Seconds to wait before retrying a failed search
    #[arg(long)]
    pub retry_delay: Option<u64>,

    /// Torrent client RPC URL: http(s)://..., scgi://host:port or scgi:///socket
    #[arg(long, requires = "client_type")]
    pub client_url: Option<String>,

    /// Torrent client type
    #[arg(long, value_parser = ["rtorrent"], requires = "client_url")]
    pub client_type: Option<String>,

    /// Search and grab regardless of history
    #[arg(long)]
    pub ignore_history: bool,

    /// Only accept results whose size matches exactly
    #[arg(long)]
    pub strict_size: bool,

    /// Skip releases with only one match
    #[arg(long)]
    pub only_dupes: bool,

    /// History file location
    #[arg(long)]
    pub history_file: Option<PathBuf>,

    /// Log file location
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Config overrides for the flags that were given.
    ///
    /// Switches are only emitted when set so they never reset a `true`
    /// coming from the config file.
    pub fn overrides(&self) -> Value {
        let mut root = Map::new();
        let mut indexer = Map::new();
        let mut search = Map::new();

        if let Some(path) = &self.input_path {
            root.insert("input_path".into(), json!(path));
        }
        if self.parse_dir {
            root.insert("parse_dir".into(), json!(true));
        }
        if let Some(path) = &self.save_path {
            root.insert("save_path".into(), json!(path));
        }

        if let Some(url) = &self.indexer_url {
            indexer.insert("url".into(), json!(url));
        }
        if let Some(key) = &self.api_key {
            indexer.insert("api_key".into(), json!(key));
        }
        if let Some(trackers) = &self.trackers {
            let trackers: Vec<&str> = trackers
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            indexer.insert("trackers".into(), json!(trackers));
        }

        for (key, set) in [
            ("match_release_group", self.match_release_group),
            ("ignore_history", self.ignore_history),
            ("strict_size", self.strict_size),
            ("only_dupes", self.only_dupes),
        ] {
            if set {
                search.insert(key.into(), json!(true));
            }
        }
        if let Some(delay) = self.delay {
            search.insert("delay_secs".into(), json!(delay));
        }
        if let Some(delay) = self.retry_delay {
            search.insert("retry_delay_secs".into(), json!(delay));
        }

        if let (Some(url), Some(client_type)) = (&self.client_url, &self.client_type) {
            root.insert(
                "torrent_client".into(),
                json!({ "client_type": client_type, "url": url }),
            );
        }
        if let Some(path) = &self.history_file {
            root.insert("history".into(), json!({ "path": path }));
        }
        if let Some(path) = &self.log_file {
            root.insert("logging".into(), json!({ "file": path }));
        }

        if !indexer.is_empty() {
            root.insert("indexer".into(), Value::Object(indexer));
        }
        if !search.is_empty() {
            root.insert("search".into(), Value::Object(search));
        }
        Value::Object(root)
    }
}
