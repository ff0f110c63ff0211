//! Torrent search abstraction.
//!
//! This module provides a `Searcher` trait for querying an indexer
//! aggregator, the Jackett backend, and the matcher that turns raw results
//! into size-checked candidates for a local release.

mod jackett;
mod matcher;
mod types;

pub use jackett::JackettSearcher;
pub use matcher::{
    build_query, build_request, category_for, match_results, strip_title_annotation, trim_result,
    SizeTolerance,
};
pub use types::*;
