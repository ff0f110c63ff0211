//! Types for the cross-seed run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The indexer searched no indexers; every later search would fail too.
    #[error("no valid indexers were searched, check the tracker names")]
    NoValidIndexers,

    /// Torrent client error.
    #[error("torrent client error: {0}")]
    TorrentClient(#[from] crate::torrent_client::TorrentClientError),

    /// History store error.
    #[error("history error: {0}")]
    History(#[from] crate::history::HistoryError),

    /// Input listing failed.
    #[error("cannot read input path {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// Metadata of the path could not be read.
    SkippedUnreadable,
    SkippedNoTitle,
    SkippedAlreadySearched,
    /// At least one member's size is unknown.
    SkippedNoSize,
    /// Neither a movie nor an episode.
    SkippedUnsupportedType,
    /// Search failed after its retry.
    SearchFailed,
    Searched {
        total: usize,
        matched: usize,
        /// Files written for this path.
        fetched: Vec<PathBuf>,
    },
}

impl PathOutcome {
    pub fn issued_search(&self) -> bool {
        matches!(self, PathOutcome::SearchFailed | PathOutcome::Searched { .. })
    }
}

/// Per-path outcomes of one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<(PathBuf, PathOutcome)>,
}

impl RunSummary {
    pub fn searched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PathOutcome::Searched { .. }))
            .count()
    }

    pub fn search_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == PathOutcome::SearchFailed)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.searched() - self.search_failures()
    }

    pub fn matched(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                PathOutcome::Searched { matched, .. } => *matched,
                _ => 0,
            })
            .sum()
    }

    /// Every file written during the run.
    pub fn fetched(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .flat_map(|(_, outcome)| match outcome {
                PathOutcome::Searched { fetched, .. } => fetched.clone(),
                _ => Vec::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            outcomes: vec![
                (PathBuf::from("a"), PathOutcome::SkippedNoTitle),
                (PathBuf::from("b"), PathOutcome::SearchFailed),
                (
                    PathBuf::from("c"),
                    PathOutcome::Searched {
                        total: 5,
                        matched: 2,
                        fetched: vec![PathBuf::from("/out/1.torrent")],
                    },
                ),
                (
                    PathBuf::from("d"),
                    PathOutcome::Searched {
                        total: 1,
                        matched: 1,
                        fetched: vec![PathBuf::from("/out/2.torrent")],
                    },
                ),
            ],
        };

        assert_eq!(summary.searched(), 2);
        assert_eq!(summary.search_failures(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.matched(), 3);
        assert_eq!(
            summary.fetched(),
            vec![PathBuf::from("/out/1.torrent"), PathBuf::from("/out/2.torrent")]
        );
    }

    #[test]
    fn test_issued_search() {
        assert!(PathOutcome::SearchFailed.issued_search());
        assert!(!PathOutcome::SkippedNoSize.issued_search());
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::NoValidIndexers;
        assert_eq!(
            err.to_string(),
            "no valid indexers were searched, check the tracker names"
        );
    }
}
