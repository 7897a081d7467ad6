//! Path helpers for config, data directory and bootstrap file locations

use std::path::{Path, PathBuf};

/// Resolve a user-supplied path to an absolute one.
///
/// `~` and `~/...` expand to the home directory; anything relative is
/// joined onto the current working directory. Surrounding whitespace is
/// ignored, so an empty value means the working directory itself.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match (path, dirs::home_dir()) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    };

    absolutize(&expanded)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
