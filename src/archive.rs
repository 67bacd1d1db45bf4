// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Backup archive creation.
//!
//! A __backup archive__ is a gzip-compressed tarball of a single source
//! directory. The tarball is rooted at the base name of the source directory,
//! so backing up `/home/me/.openclaw/workspace` produces entries like
//! `workspace/`, `workspace/notes.md`, etc.
//!
//! Archives are staged in an archive directory (the OS temporary directory by
//! default) under the name `<prefix>-<YYYYMMDD-HHMMSS>.tar.gz`, stamped with
//! the current local time. They are meant to live only until the upload is
//! done.

use crate::path::default_archive_dir;

use chrono::{Local, NaiveDateTime};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// Format used to stamp archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Determine archive file name for prefix and timestamp.
pub fn archive_file_name(prefix: impl AsRef<str>, timestamp: &NaiveDateTime) -> String {
    format!("{}-{}.tar.gz", prefix.as_ref(), timestamp.format(TIMESTAMP_FORMAT))
}

/// Writes backup archives into an archive directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archiver {
    archive_dir: PathBuf,
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new(default_archive_dir())
    }
}

impl Archiver {
    /// Construct new archiver that stages archives in target directory.
    pub fn new(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
        }
    }

    /// Archive source directory.
    ///
    /// Creates the archive directory if needed, then writes the full subtree
    /// of the source directory into a new backup archive. Symbolic links are
    /// stored as links. If the source directory does not exist, a warning is
    /// logged and an empty archive is produced anyway.
    ///
    /// # Errors
    ///
    /// - Return [`ArchiveError::ArchiveDir`] if archive directory cannot be
    ///   created.
    /// - Return [`ArchiveError::Write`] if reading the source tree or writing
    ///   the archive fails.
    #[instrument(skip(self, source, prefix), level = "debug")]
    pub fn create(
        &self,
        source: impl AsRef<Path>,
        prefix: impl AsRef<str>,
    ) -> Result<BackupArchive> {
        let source = source.as_ref();
        let file_name = archive_file_name(prefix, &Local::now().naive_local());
        let path = self.archive_dir.join(&file_name);

        mkdirp::mkdirp(&self.archive_dir).map_err(|error| ArchiveError::ArchiveDir {
            path: self.archive_dir.clone(),
            source: error,
        })?;

        info!("create backup: {file_name}");
        write_tarball(&path, source).map_err(|error| ArchiveError::Write {
            path: path.clone(),
            source: error,
        })?;

        let size = fs::metadata(&path)
            .map_err(|error| ArchiveError::Write {
                path: path.clone(),
                source: error,
            })?
            .len();

        Ok(BackupArchive {
            path,
            file_name,
            size,
        })
    }
}

fn write_tarball(path: &Path, source: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    let root = root_name(source);
    if source.is_dir() {
        builder.append_dir_all(&root, source)?;
        info!("added: {}", source.display());
    } else if source.exists() {
        builder.append_path_with_name(source, &root)?;
        info!("added: {}", source.display());
    } else {
        warn!("directory does not exist: {}", source.display());
    }

    // INVARIANT: Finish both layers, or the gzip trailer is never written.
    builder.into_inner()?.finish()?.sync_all()
}

// Paths like "." have no base name of their own.
fn root_name(source: &Path) -> PathBuf {
    source
        .file_name()
        .map(PathBuf::from)
        .or_else(|| {
            source
                .canonicalize()
                .ok()
                .and_then(|path| path.file_name().map(PathBuf::from))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Backup archive staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArchive {
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl BackupArchive {
    /// Absolute path to archive file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// File name of archive, also used as its remote name.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Size of archive in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Delete archive file from local file system.
    pub fn remove(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}

/// Archive creation error types.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Archive directory cannot be created.
    #[error("failed to create archive directory {:?}", path.display())]
    ArchiveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source tree cannot be read, or archive cannot be written.
    #[error("failed to write archive {:?}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Friendly result alias :3
type Result<T, E = ArchiveError> = std::result::Result<T, E>;
