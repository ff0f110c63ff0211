//! Output file naming.

use std::path::{Path, PathBuf};

/// Longest file name component most filesystems accept, in bytes.
const MAX_NAME_BYTES: usize = 255;

/// Display name of a result as `[tracker] title`, made safe for a file name.
pub fn release_file_name(tracker: &str, title: &str) -> String {
    sanitize_name(&format!("[{}] {}", tracker, title))
}

/// Replace `/` with `-` and drop every character that is not a word
/// character or one of `-_.()[] `.
pub fn sanitize_name(name: &str) -> String {
    name.replace('/', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')' | '[' | ']' | ' '))
        .collect()
}

/// Cut `name` so that `name + ext` plus a NUL fits in one path component.
///
/// Never splits a multi-byte character.
pub fn truncate_name<'a>(name: &'a str, ext: &str) -> &'a str {
    let max_bytes = (MAX_NAME_BYTES - 1).saturating_sub(ext.len());
    if name.len() <= max_bytes {
        return name;
    }

    let end = name
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &name[..end]
}

/// First free path in `dir` for `name + ext`, appending ` (n)` on collision.
pub fn unique_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{}{}", truncate_name(name, ext), ext));
    if !candidate.exists() {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let suffix = format!(" ({}){}", n, ext);
        let candidate = dir.join(format!("{}{}", truncate_name(name, &suffix), suffix));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
