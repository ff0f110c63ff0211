//! Local release descriptors.
//!
//! Turns a path on disk into a `LocalRelease`: its basename, total size,
//! parsed title metadata and an optional release-group tag.

mod builder;
mod name_parser;
mod types;

pub use builder::{build_release, extract_release_group, total_size};
pub use name_parser::{HeuristicNameParser, NameParser};
pub use types::*;
