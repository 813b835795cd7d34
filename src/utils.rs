//! Shared filesystem helpers.
//!
//! These functions are reused by the CLI logging setup and the TUI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Gets the cross-platform log file path used while the TUI owns the terminal.
///
/// Returns the path as `{data_dir}/knowrn/knowrn.log` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_log_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("knowrn").join("knowrn.log"))
}

/// Ensures the parent directory of `path` exists.
///
/// Creates the directory structure if it doesn't exist using `create_dir_all`.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
