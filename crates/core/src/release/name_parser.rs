//! Release-name parsing.
//!
//! The `NameParser` trait is the seam for any media-name guessing backend.
//! `HeuristicNameParser` covers common scene-style names without external
//! services.

use regex_lite::Regex;

use super::{ContentType, ParsedName};

/// Extracts title/year/season/episode from a free-text release name.
pub trait NameParser: Send + Sync {
    fn parse(&self, name: &str) -> ParsedName;
}

/// Extensions stripped before parsing.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "m4v", "avi", "mov", "wmv", "ts", "m2ts", "webm", "mpg", "mpeg", "iso", "flac",
    "mp3", "srt", "nfo",
];

/// Scene-name heuristics.
///
/// The title is everything before the first recognised marker (episode tag,
/// year, resolution, source or codec token, bracket), with `.` and `_` read as
/// spaces. Tokens that double as English words (`web`, `complete`, `proper`,
/// ...) never end a title.
pub struct HeuristicNameParser {
    episode: Regex,
    cross_episode: Regex,
    season: Regex,
    year: Regex,
    resolution: Regex,
    source: Regex,
}

impl Default for HeuristicNameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicNameParser {
    pub fn new() -> Self {
        Self {
            episode: Regex::new(r"(?i)\bS(\d{1,2}) ?E(\d{1,3})\b").expect("valid episode regex"),
            cross_episode: Regex::new(r"\b(\d{1,2})x(\d{2,3})\b").expect("valid NxNN regex"),
            season: Regex::new(r"(?i)\bS(\d{1,2})\b").expect("valid season regex"),
            year: Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid year regex"),
            resolution: Regex::new(r"(?i)\b(2160p|1080p|1080i|720p|576p|480p)\b")
                .expect("valid resolution regex"),
            source: Regex::new(
                r"(?i)\b(bluray|blu-ray|bdrip|brrip|web-dl|webdl|webrip|hdtv|dvdrip|remux|x264|x265|h264|h265|hevc|xvid)\b",
            )
            .expect("valid source regex"),
        }
    }

    /// Earliest marker position in `text`, if any.
    fn first_marker(&self, text: &str) -> Option<usize> {
        let mut positions = Vec::new();

        positions.extend(self.episode.find(text).map(|m| m.start()));
        positions.extend(self.cross_episode.find(text).map(|m| m.start()));
        positions.extend(self.season.find(text).map(|m| m.start()));
        positions.extend(self.resolution.find(text).map(|m| m.start()));
        // A leading year or source tag is part of the title ("2012").
        for regex in [&self.year, &self.source] {
            positions.extend(regex.find_iter(text).map(|m| m.start()).find(|&start| start > 0));
        }
        positions.extend(text.find(['(', '[']));

        positions.into_iter().min()
    }
}

impl NameParser for HeuristicNameParser {
    fn parse(&self, name: &str) -> ParsedName {
        let stem = strip_media_extension(name);
        let text = strip_leading_brackets(&stem.replace(['.', '_'], " "));

        let (season, episode) = if let Some(caps) = self.episode.captures(&text) {
            (caps[1].parse().ok(), caps[2].parse().ok())
        } else if let Some(caps) = self.cross_episode.captures(&text) {
            (caps[1].parse().ok(), caps[2].parse().ok())
        } else if let Some(caps) = self.season.captures(&text) {
            (caps[1].parse().ok(), None)
        } else {
            (None, None)
        };

        let year = self
            .year
            .find_iter(&text)
            .find(|m| m.start() > 0)
            .and_then(|m| m.as_str().parse().ok());

        let title_end = match self.first_marker(&text) {
            Some(end) => end,
            // "Title-GRP" with nothing else to go on: drop the group.
            None => text.rfind('-').unwrap_or(text.len()),
        };
        let title = text[..title_end]
            .trim()
            .trim_end_matches(['-', ' '])
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let title = (!title.is_empty()).then_some(title);

        let content_type = if season.is_some() || episode.is_some() {
            ContentType::Episode
        } else if title.is_some() {
            ContentType::Movie
        } else {
            ContentType::Unknown
        };

        ParsedName {
            title,
            year,
            season,
            episode,
            content_type,
        }
    }
}

fn strip_media_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && MEDIA_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext)) =>
        {
            stem
        }
        _ => name,
    }
}

/// Drop leading `[Group]` tags common in fansub names.
fn strip_leading_brackets(text: &str) -> String {
    let mut rest = text.trim_start();
    while let Some(inner) = rest.strip_prefix('[') {
        match inner.find(']') {
            Some(end) => rest = inner[end + 1..].trim_start(),
            None => break,
        }
    }
    rest.to_string()
}
