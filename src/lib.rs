// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Back up a workspace directory to a WebDAV server.
//!
//! A backup run archives one directory into a gzip-compressed tarball, and
//! uploads that tarball to a WebDAV server through a single authenticated
//! HTTP PUT. The local tarball is deleted once the server accepted it, and is
//! kept otherwise.
//!
//! WebDAV credentials are resolved from environment variables first, then from
//! the `webdav-backup` skill entry of the host application's configuration
//! file. See [`config`] for the exact precedence rules.

pub mod archive;
pub mod backup;
pub mod config;
pub mod path;
pub mod upload;
