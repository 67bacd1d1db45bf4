// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! WebDAV upload.
//!
//! Uploading is one authenticated HTTP PUT of the whole archive to
//! `<base url>/<archive name>`. The archive is buffered in memory before it
//! is sent. There is no retry, and no chunked or resumable transfer.

use crate::config::Config;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{blocking::Client, header::CONTENT_TYPE, redirect::Policy, StatusCode};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, instrument};

/// Guidance for a 404 response.
pub const NOT_FOUND_HINT: &str = "404 usually means the destination folder does not exist \
on the WebDAV server; create it through the provider's web interface first, e.g. \
https://dav.example.com/dav/openclaw-backup/";

/// Guidance for a 401 response.
pub const UNAUTHORIZED_HINT: &str = "401 means authentication failed; check the username \
and password, and note that many WebDAV providers require an application-specific \
password instead of the account login password";

/// Layer of indirection for archive upload.
pub trait Upload {
    /// Upload local file under a remote name.
    fn upload(&self, local_file: &Path, remote_name: &str) -> Result<()>;
}

/// Check if response status counts as a successful upload.
pub fn is_accepted(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT
    )
}

/// Upload through HTTP PUT with basic authentication.
#[derive(Debug, Clone)]
pub struct DavUploader {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl DavUploader {
    /// Construct new uploader from resolved configuration.
    ///
    /// The total request timeout of the HTTP client is disabled, so large
    /// archives are not cut off mid-transfer. Redirects are never followed, so
    /// a 3xx answer is reported as a failed upload.
    ///
    /// # Errors
    ///
    /// - Return [`UploadError::Client`] if HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .redirect(Policy::none())
            .build()
            .map_err(UploadError::Client)?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Determine remote URL of target file name.
    ///
    /// Trailing slashes of the base URL are stripped before joining.
    pub fn remote_url(&self, remote_name: impl AsRef<str>) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            remote_name.as_ref()
        )
    }
}

impl Upload for DavUploader {
    /// Upload local file through a single PUT request.
    ///
    /// Statuses 200, 201, and 204 count as success.
    ///
    /// # Errors
    ///
    /// - Return [`UploadError::Read`] if local file cannot be read.
    /// - Return [`UploadError::Transport`] if the request cannot be sent.
    /// - Return [`UploadError::Status`] for any other response status.
    /// - Return [`UploadError::IndicatifStyleTemplate`] if spinner cannot be
    ///   styled.
    #[instrument(skip(self, local_file), level = "debug")]
    fn upload(&self, local_file: &Path, remote_name: &str) -> Result<()> {
        let url = self.remote_url(remote_name);
        info!("upload to WebDAV: {url}");

        let body = fs::read(local_file).map_err(|error| UploadError::Read {
            path: local_file.to_path_buf(),
            source: error,
        })?;

        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.green} {elapsed_precise:.green}  {msg}",
        )?);
        bar.set_message(format!("uploading {remote_name}"));
        bar.enable_steady_tick(Duration::from_millis(100));

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send();
        bar.finish_and_clear();

        let status = response
            .map_err(|error| UploadError::Transport {
                url: url.clone(),
                source: error,
            })?
            .status();
        if !is_accepted(status) {
            return Err(UploadError::Status { url, status });
        }

        info!("uploaded: {remote_name}");
        Ok(())
    }
}

/// All possible error types for archive upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// HTTP client cannot be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Local file cannot be read.
    #[error("failed to read {:?}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Request never produced a response.
    #[error("upload to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a status other than 200, 201, or 204.
    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

impl UploadError {
    /// Operator guidance for well known failures.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Status { status, .. } if *status == StatusCode::NOT_FOUND => Some(NOT_FOUND_HINT),
            Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                Some(UNAUTHORIZED_HINT)
            }
            _ => None,
        }
    }
}

/// Friendly result alias :3
type Result<T, E = UploadError> = std::result::Result<T, E>;
