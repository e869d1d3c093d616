//! Utility functions shared across the crate.

use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Default output path derived from the first input: `<stem>-merged.pdf` next to it.
pub fn default_output_path(first_input: &std::path::Path) -> PathBuf {
    let stem = first_input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    first_input.with_file_name(format!("{stem}-merged.pdf"))
}
