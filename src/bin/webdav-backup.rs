// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use webdav_backup::{
    archive::Archiver,
    backup::{BackupError, BackupJob},
    config::Config,
    upload::DavUploader,
};

use anyhow::Result;
use clap::Parser;
use indoc::indoc;
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default prefix of backup archive names.
const DEFAULT_PREFIX: &str = "openclaw-backup";

const SETUP_INSTRUCTIONS: &str = indoc! {r#"
    WebDAV configuration is missing.

    Option 1: edit ~/.openclaw/openclaw.json
      {
        "skills": {
          "entries": {
            "webdav-backup": {
              "enabled": true,
              "env": {
                "WEBDAV_URL": "https://dav.example.com/dav/",
                "WEBDAV_USERNAME": "your-email",
                "WEBDAV_PASSWORD": "your-password"
              }
            }
          }
        }
      }

    Option 2: set environment variables
      export WEBDAV_URL='https://dav.example.com/dav/'
      export WEBDAV_USERNAME='your-email'
      export WEBDAV_PASSWORD='your-password'
"#};

/// Back up a workspace directory to a WebDAV server.
#[derive(Debug, Clone, Parser)]
#[command(about, version)]
struct Cli {
    /// Directory to back up [default: $OPENCLAW_WORKSPACE or ~/.openclaw/workspace].
    #[arg(short, long, value_name = "dir")]
    pub source: Option<PathBuf>,

    /// Prefix of backup archive name.
    #[arg(short, long, value_name = "prefix", default_value = DEFAULT_PREFIX)]
    pub name: String,

    /// List backups stored on WebDAV server.
    #[arg(short, long)]
    pub list: bool,

    /// Restore target backup.
    #[arg(short, long, value_name = "backup")]
    pub restore: Option<String>,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = Config::load();

        if self.list {
            run_list(&config);
            return Ok(());
        }

        if let Some(backup) = self.restore {
            run_restore(backup);
            return Ok(());
        }

        if let Err(error) = config.ensure_complete() {
            println!("{SETUP_INSTRUCTIONS}");
            return Err(error.into());
        }

        let source = match self.source {
            Some(source) => source,
            None => config.workspace_dir()?,
        };
        run_backup(&config, source, self.name)
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = Cli::parse().run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run_backup(config: &Config, source: PathBuf, prefix: String) -> Result<()> {
    let job = BackupJob::new(Archiver::default(), DavUploader::new(config)?);
    match job.run(source, prefix) {
        Ok(_) => Ok(()),
        Err(error) => {
            if let BackupError::Upload { source, .. } = &error {
                if let Some(hint) = source.hint() {
                    warn!("{hint}");
                }
            }
            Err(error.into())
        }
    }
}

// Listing needs PROPFIND, which this tool does not speak.
fn run_list(config: &Config) {
    info!("listing backups needs PROPFIND support from the WebDAV server");
    info!("WebDAV URL: {}", config.url);
}

fn run_restore(backup: String) {
    info!("restore of {backup:?} is under development");
}
