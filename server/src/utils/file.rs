//! File path helpers

use std::path::PathBuf;

use directories::BaseDirs;

fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Expand a user-supplied path to an absolute path.
///
/// - `~` and `~/rest` resolve against the home directory
/// - relative paths (including bare names) resolve against the working directory
/// - absolute paths pass through unchanged
/// - surrounding whitespace is ignored; an empty string means the working directory
///
/// ```text
/// expand_path("~/.usergrid")  // -> /home/user/.usergrid
/// expand_path("./data")       // -> /current/dir/./data
/// expand_path("/etc/usergrid")// -> /etc/usergrid
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => match home_dir() {
            Some(home) => home.join(&rest[1..]),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}
