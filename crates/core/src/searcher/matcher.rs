//! Query construction and result matching against a local release.

use regex_lite::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::config::SearchConfig;
use crate::release::{ContentType, LocalRelease};

use super::{RawSearchResult, SearchRequest, SearchResult, CATEGORY_MOVIES, CATEGORY_TV};

static TITLE_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)( \[.*/.*\])?$").expect("valid title annotation regex")
});

/// Torznab category for a content type. `None` means the release cannot be
/// searched.
pub fn category_for(content_type: ContentType) -> Option<u32> {
    match content_type {
        ContentType::Movie => Some(CATEGORY_MOVIES),
        ContentType::Episode => Some(CATEGORY_TV),
        ContentType::Unknown => None,
    }
}

/// Free-text query: title, then year, then the release group when enabled.
pub fn build_query(release: &LocalRelease, match_release_group: bool) -> Option<String> {
    let mut query = release.title()?.to_string();

    if let Some(year) = release.parsed.year {
        query.push_str(&format!(" {}", year));
    }
    if match_release_group {
        if let Some(group) = &release.release_group {
            query.push(' ');
            query.push_str(group);
        }
    }

    Some(query)
}

/// Build the indexer request for a release, or `None` when it has no title
/// or an unsearchable content type.
pub fn build_request(
    release: &LocalRelease,
    trackers: &[String],
    match_release_group: bool,
) -> Option<SearchRequest> {
    let category = category_for(release.parsed.content_type)?;
    let query = build_query(release, match_release_group)?;

    Some(SearchRequest {
        query,
        category,
        season: release.parsed.season,
        episode: release.parsed.episode,
        trackers: trackers.to_vec(),
    })
}

/// Remove a trailing ` [... / ...]` annotation from a result title.
///
/// Returns `None` when the title does not fit the expected shape at all.
pub fn strip_title_annotation(title: &str) -> Option<&str> {
    TITLE_ANNOTATION
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Project a raw result onto the fields used downstream.
pub fn trim_result(raw: RawSearchResult) -> SearchResult {
    let raw_title = raw.title.unwrap_or_default();
    let title = match strip_title_annotation(&raw_title) {
        Some(stripped) => stripped.to_string(),
        None => {
            debug!(title = %raw_title, "Result title did not match annotation pattern");
            raw_title.clone()
        }
    };

    let tracker = raw.tracker.unwrap_or_default();
    let tracker_id = raw.tracker_id.unwrap_or_else(|| tracker.clone());
    let details_url = raw
        .details
        .or_else(|| raw.link.clone())
        .unwrap_or_default();

    SearchResult {
        tracker,
        tracker_id,
        title,
        link: raw.link.filter(|link| !link.is_empty()),
        details_url,
        size_bytes: raw.size,
        info_hash: raw
            .info_hash
            .filter(|hash| !hash.is_empty())
            .map(|hash| hash.to_uppercase()),
        category: raw.category,
        category_description: raw.category_desc,
        imdb_id: raw.imdb,
    }
}

/// Allowed size difference between a result and the local release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeTolerance {
    base_bytes: u64,
    tracker_multipliers: BTreeMap<String, u64>,
}

impl SizeTolerance {
    /// Exact size match only.
    pub fn strict() -> Self {
        Self {
            base_bytes: 0,
            tracker_multipliers: BTreeMap::new(),
        }
    }

    pub fn lenient(base_bytes: u64, tracker_multipliers: BTreeMap<String, u64>) -> Self {
        Self {
            base_bytes,
            tracker_multipliers,
        }
    }

    pub fn from_config(search: &SearchConfig) -> Self {
        if search.strict_size {
            Self::strict()
        } else {
            Self::lenient(
                search.size_tolerance_bytes,
                search.tracker_size_multipliers.clone(),
            )
        }
    }

    /// Tolerance in bytes for results from `tracker`.
    pub fn effective_for(&self, tracker: &str) -> u64 {
        let multiplier = self.tracker_multipliers.get(tracker).copied().unwrap_or(1);
        self.base_bytes.saturating_mul(multiplier)
    }

    pub fn accepts(&self, local_size: u64, result: &SearchResult) -> bool {
        match result.size_bytes {
            Some(size) => size.abs_diff(local_size) <= self.effective_for(&result.tracker),
            None => false,
        }
    }
}

/// Trim raw results and keep those whose size fits the local release.
///
/// Indexer order is preserved. A release of unknown size matches nothing.
pub fn match_results(
    release: &LocalRelease,
    raw_results: Vec<RawSearchResult>,
    tolerance: &SizeTolerance,
) -> Vec<SearchResult> {
    let Some(local_size) = release.size_bytes else {
        return Vec::new();
    };

    raw_results
        .into_iter()
        .map(trim_result)
        .filter(|result| {
            let accepted = tolerance.accepts(local_size, result);
            debug!(
                tracker = %result.tracker,
                title = %result.title,
                size = ?result.size_bytes,
                local_size,
                accepted,
                "Size check"
            );
            accepted
        })
        .collect()
}
