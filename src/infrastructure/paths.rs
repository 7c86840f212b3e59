//! Where the launcher keeps its files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const APP_NAME: &str = "arc-launcher";

/// Platform data directory, e.g. `~/.local/share/arc-launcher` on Linux.
///
/// Falls back to `./arc-launcher` when the platform reports no home directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME).map_or_else(
        || {
            tracing::debug!("no platform data directory, using working directory");
            PathBuf::from(APP_NAME)
        },
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Expands a leading `~` to the user's home directory. Other paths pass through.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use arc_launcher::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/var/lib/launcher"), PathBuf::from("/var/lib/launcher"));
/// assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => Path::new(path).to_path_buf(),
    }
}
