//! Path expansion and normalization helpers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Expand `~/` and `$VAR` / `${VAR}` references in a configured path.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set or the home
/// directory cannot be determined.
///
/// # Examples
///
/// ```rust,no_run
/// use pfs_finder::utils::expand_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = expand_path("$HOME/pfs/data")?;
/// # Ok(())
/// # }
/// ```
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| format!("Invalid path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Make `path` absolute against the current directory without touching the filesystem.
/// An empty path stands for the current directory.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        std::env::current_dir()
    } else {
        std::path::absolute(path)
    }
}
