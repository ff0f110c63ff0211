//! Shortcut files for magnet links.

use serde::{Deserialize, Serialize};

/// Text format used to save a magnet link as a clickable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutStyle {
    /// `[InternetShortcut]` (.url), understood by Windows and macOS.
    InternetShortcut,
    /// freedesktop.org `[Desktop Entry]` (.desktop).
    DesktopEntry,
}

impl ShortcutStyle {
    /// Style native to the host platform.
    pub fn detect() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            ShortcutStyle::InternetShortcut
        } else {
            ShortcutStyle::DesktopEntry
        }
    }

    /// File extension, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ShortcutStyle::InternetShortcut => ".url",
            ShortcutStyle::DesktopEntry => ".desktop",
        }
    }

    pub fn render(&self, url: &str) -> String {
        match self {
            ShortcutStyle::InternetShortcut => format!("[InternetShortcut]\nURL={}\n", url),
            ShortcutStyle::DesktopEntry => format!(
                "[Desktop Entry]\nEncoding=UTF-8\nType=Link\nURL={}\nIcon=text-html\n",
                url
            ),
        }
    }
}
