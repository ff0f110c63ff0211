//! Types describing a local release.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of content a release name describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Movie,
    Episode,
    Unknown,
}

/// Structured guess about a release name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    /// `None` when no usable title could be extracted.
    pub title: Option<String>,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub content_type: ContentType,
}

impl ParsedName {
    /// A name nothing could be extracted from.
    pub fn unknown() -> Self {
        Self {
            title: None,
            year: None,
            season: None,
            episode: None,
            content_type: ContentType::Unknown,
        }
    }
}

/// Immutable description of the local file or folder being cross-seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRelease {
    pub path: PathBuf,
    /// Final path component; the key for "already searched".
    pub basename: String,
    /// Total size in bytes. `None` if any member's size is unknown.
    pub size_bytes: Option<u64>,
    pub parsed: ParsedName,
    pub release_group: Option<String>,
}

impl LocalRelease {
    pub fn title(&self) -> Option<&str> {
        self.parsed.title.as_deref()
    }
}
