//! Path helpers

use std::path::PathBuf;

/// Expand a user-supplied path to an absolute path
///
/// Handles `~` and `~/...` through the home directory; relative paths are joined to
/// the current directory; absolute paths pass through unchanged.
///
/// ```text
/// expand_path("~/.cquery/cquery.json") // -> /home/user/.cquery/cquery.json
/// expand_path("data/app.db")           // -> /current/dir/data/app.db
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Normalise a SQLite database location
///
/// `sqlite:` URLs and `:memory:` are kept as given; bare file paths are expanded.
pub fn sqlite_location(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("sqlite:") || url == ":memory:" {
        url.to_string()
    } else {
        expand_path(url).to_string_lossy().into_owned()
    }
}
