//! Builds `LocalRelease` descriptors from paths on disk.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use super::{LocalRelease, NameParser};

/// Describe the file or directory at `path`.
///
/// Free-text parsing of the basename is delegated to `parser`.
pub fn build_release(path: &Path, parser: &dyn NameParser) -> io::Result<LocalRelease> {
    let basename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let size_bytes = total_size(path)?;
    if size_bytes.is_none() {
        debug!(path = %path.display(), "Could not determine release size");
    }

    Ok(LocalRelease {
        path: path.to_path_buf(),
        parsed: parser.parse(&basename),
        release_group: extract_release_group(&basename),
        basename,
        size_bytes,
    })
}

/// Total size of a file or directory tree, in bytes.
///
/// Links are resolved and contribute their target's size. Returns `Ok(None)`
/// as soon as any member's size is unknown (e.g. a dangling link).
pub fn total_size(path: &Path) -> io::Result<Option<u64>> {
    if path.is_file() {
        return file_size(path);
    }
    if !path.is_dir() {
        return Ok(None);
    }

    let mut total = 0u64;
    for entry in walkdir::WalkDir::new(path) {
        let entry = entry.map_err(io::Error::from)?;

        if entry.file_type().is_dir() {
            continue;
        }
        // Linked directories are not descended into.
        if entry.path_is_symlink() && entry.path().is_dir() {
            continue;
        }

        match file_size(entry.path())? {
            Some(size) => total += size,
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}

fn file_size(path: &Path) -> io::Result<Option<u64>> {
    let metadata = fs::symlink_metadata(path)?;
    if !metadata.file_type().is_symlink() {
        return Ok(Some(metadata.len()));
    }

    match fs::metadata(path) {
        Ok(target) if target.is_file() => Ok(Some(target.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Extract the release group from the last hyphen-delimited segment of a
/// basename, e.g. `Movie.Name.2020-GRP.mkv` yields `GRP`.
///
/// Segments containing spaces or periods are not release groups.
pub fn extract_release_group(basename: &str) -> Option<String> {
    let (_, segment) = basename.rsplit_once('-')?;

    let stem = match segment.rfind('.') {
        Some(i) if segment[..i].chars().any(|c| c != '.') => &segment[..i],
        _ => segment,
    };
    let group = stem.trim();

    if group.is_empty() || group.contains([' ', '.']) {
        return None;
    }
    Some(group.to_string())
}
