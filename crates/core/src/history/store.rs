//! JSON-file backed history store.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while persisting history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk history document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    /// Basenames already searched, in search order.
    #[serde(rename = "basenamesSearched", alias = "basenames_searched", default)]
    pub basenames_searched: Vec<String>,
    /// Tracker id -> details-URL paths already grabbed from that tracker.
    #[serde(rename = "downloadHistory", alias = "download_history", default)]
    pub download_history: BTreeMap<String, Vec<String>>,
}

impl SearchHistory {
    pub fn was_searched(&self, basename: &str) -> bool {
        self.basenames_searched.iter().any(|name| name == basename)
    }

    pub fn mark_searched(&mut self, basename: &str) {
        if !self.was_searched(basename) {
            self.basenames_searched.push(basename.to_string());
        }
    }

    /// Whether `details_url` was already grabbed from `tracker_id`, compared by
    /// URL path so proxy domains of the same tracker are recognised.
    pub fn was_grabbed(&self, tracker_id: &str, details_url: &str) -> bool {
        let url_path = details_path(details_url);
        self.download_history
            .get(tracker_id)
            .is_some_and(|paths| paths.iter().any(|p| p == url_path))
    }

    /// Record a grab. Never stores the same path twice for a tracker.
    pub fn record_grab(&mut self, tracker_id: &str, details_url: &str) {
        let url_path = details_path(details_url);
        let paths = self
            .download_history
            .entry(tracker_id.to_string())
            .or_default();
        if !paths.iter().any(|p| p == url_path) {
            paths.push(url_path.to_string());
        }
    }
}

static URL_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^/]+(/.*)").expect("valid url path regex"));

/// Strip scheme and host from a details URL:
/// `https://proxy9.tracker.org/details?id=55` -> `/details?id=55`.
///
/// URLs without a path are returned unchanged.
pub fn details_path(details_url: &str) -> &str {
    URL_PATH
        .captures(details_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(details_url)
}

/// History document bound to a file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: SearchHistory,
}

impl HistoryStore {
    /// Load history from `path`.
    ///
    /// A missing or unreadable document is treated as empty and the file is
    /// recreated.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();

        let loaded = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<SearchHistory>(&text).map_err(|e| e.to_string())
            });

        match loaded {
            Ok(history) => {
                debug!(
                    path = %path.display(),
                    searched = history.basenames_searched.len(),
                    trackers = history.download_history.len(),
                    "Loaded search history"
                );
                Ok(Self { path, history })
            }
            Err(reason) => {
                if path.exists() {
                    warn!(path = %path.display(), reason = %reason, "Discarding unreadable search history");
                }
                let store = Self {
                    path,
                    history: SearchHistory::default(),
                };
                store.save()?;
                Ok(store)
            }
        }
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    /// Rewrite the history file with the current contents.
    ///
    /// The document is written to a sibling temp file and renamed over the
    /// old one, so the file on disk is always a complete document.
    pub fn save(&self) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(&self.history)?;
        let write_error = |source: std::io::Error| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(json.as_bytes()).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(&self.path).map_err(|e| write_error(e.error))?;
        Ok(())
    }
}
