// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Backup pipeline.
//!
//! A backup run is strictly linear: archive the source directory, upload the
//! archive, then delete the local archive. The local archive is only deleted
//! once the upload succeeded. On a failed upload it is kept in the archive
//! directory, so the operator can inspect it or retry by hand.

use crate::{
    archive::{ArchiveError, Archiver},
    upload::{DavUploader, Upload, UploadError},
};

use indicatif::HumanBytes;
use std::{
    io,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Single backup run over an archiver and an uploader.
#[derive(Debug)]
pub struct BackupJob<U = DavUploader>
where
    U: Upload,
{
    pub(crate) archiver: Archiver,
    pub(crate) uploader: U,
}

impl<U> BackupJob<U>
where
    U: Upload,
{
    /// Construct new backup job.
    pub fn new(archiver: Archiver, uploader: U) -> Self {
        Self { archiver, uploader }
    }

    /// Archive source directory, and upload it under its archive name.
    ///
    /// Returns the remote name of the uploaded archive.
    ///
    /// # Errors
    ///
    /// - Return [`BackupError::Archive`] if archive creation fails.
    /// - Return [`BackupError::Upload`] if upload fails. The local archive is
    ///   kept, and its path is part of the error.
    /// - Return [`BackupError::Cleanup`] if the uploaded archive cannot be
    ///   deleted locally.
    #[instrument(skip(self, source, prefix), level = "debug")]
    pub fn run(&self, source: impl AsRef<Path>, prefix: impl AsRef<str>) -> Result<String> {
        let archive = self.archiver.create(source, prefix)?;
        let remote_name = archive.file_name().to_string();
        info!("backup size: {}", HumanBytes(archive.size()));

        if let Err(error) = self.uploader.upload(archive.path(), &remote_name) {
            return Err(BackupError::Upload {
                kept: archive.path().to_path_buf(),
                source: error,
            });
        }

        let path = archive.path().to_path_buf();
        archive
            .remove()
            .map_err(|error| BackupError::Cleanup { path, source: error })?;
        info!("backup complete: {remote_name}");

        Ok(remote_name)
    }
}

/// All possible error types for a backup run.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Archive creation fails.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Upload fails, and local archive is kept.
    #[error("upload failed, local backup kept at {:?}", kept.display())]
    Upload {
        kept: PathBuf,
        #[source]
        source: UploadError,
    },

    /// Uploaded archive cannot be deleted locally.
    #[error("uploaded, but failed to delete local backup {:?}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Friendly result alias :3
type Result<T, E = BackupError> = std::result::Result<T, E>;
