// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where the host application keeps its configuration and its
//! workspace, and where archives are staged before upload.

use std::path::PathBuf;

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine candidate paths of the host application's configuration file.
///
/// Candidates are returned in lookup order: `~/.openclaw/openclaw.json`
/// first, then `~/.config/openclaw/openclaw.json`. The second path is always
/// rooted at `~/.config`, even on platforms whose configuration directory
/// lives elsewhere. Does not check if the paths returned actually exist.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn config_candidates() -> Result<[PathBuf; 2]> {
    let home = home_dir()?;
    Ok([
        home.join(".openclaw").join("openclaw.json"),
        home.join(".config").join("openclaw").join("openclaw.json"),
    ])
}

/// Determine default absolute path to the workspace directory to back up.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_workspace_dir() -> Result<PathBuf> {
    home_dir().map(|path| path.join(".openclaw").join("workspace"))
}

/// Determine directory that archives are staged in before upload.
///
/// Uses the temporary directory of the operating system, which honors
/// `$TMPDIR` on Unix.
pub fn default_archive_dir() -> PathBuf {
    std::env::temp_dir()
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
