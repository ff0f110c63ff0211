use std::collections::HashSet;
use std::fmt;

use crate::config::SearchConfig;
use crate::history::SearchHistory;
use crate::searcher::SearchResult;

/// Outcome of the pre-download checks for one matching result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabDecision {
    Fetch,
    SkipNoLink,
    SkipOnlyDupesPolicy,
    SkipAlreadyGrabbed,
    SkipAlreadyInClient,
}

impl GrabDecision {
    pub fn is_fetch(&self) -> bool {
        matches!(self, GrabDecision::Fetch)
    }
}

impl fmt::Display for GrabDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GrabDecision::Fetch => "fetching",
            GrabDecision::SkipNoLink => "no download link",
            GrabDecision::SkipOnlyDupesPolicy => "only one match and only-dupes is set",
            GrabDecision::SkipAlreadyGrabbed => "already grabbed",
            GrabDecision::SkipAlreadyInClient => "already in torrent client",
        };
        f.write_str(text)
    }
}

/// Run-wide switches that influence grab decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrabPolicy {
    pub ignore_history: bool,
    pub only_dupes: bool,
}

impl GrabPolicy {
    pub fn from_config(search: &SearchConfig) -> Self {
        Self {
            ignore_history: search.ignore_history,
            only_dupes: search.only_dupes,
        }
    }
}

/// Decide whether `result` should be fetched.
///
/// Checks run in a fixed order and the first that applies wins.
/// `match_count` is the number of matches for the whole release.
pub fn decide(
    result: &SearchResult,
    history: &SearchHistory,
    existing_hashes: &HashSet<String>,
    policy: &GrabPolicy,
    match_count: usize,
) -> GrabDecision {
    if result.link.is_none() {
        return GrabDecision::SkipNoLink;
    }

    if policy.only_dupes && match_count == 1 {
        return GrabDecision::SkipOnlyDupesPolicy;
    }

    if !policy.ignore_history && history.was_grabbed(&result.tracker_id, &result.details_url) {
        return GrabDecision::SkipAlreadyGrabbed;
    }

    if let Some(hash) = &result.info_hash {
        if existing_hashes.contains(hash) {
            return GrabDecision::SkipAlreadyInClient;
        }
    }

    GrabDecision::Fetch
}
