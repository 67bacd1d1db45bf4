// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout and resolution.
//!
//! WebDAV credentials can come from two places: environment variables, or the
//! `webdav-backup` __skill entry__ inside the host application's JSON
//! configuration file. Environment variables always take precedence over the
//! configuration file, and anything left unset resolves to an empty string.
//!
//! # Host Configuration Layout
//!
//! The host application keeps one JSON file that configures all of its skills.
//! Only the `webdav-backup` entry matters here:
//!
//! ```json
//! {
//!   "skills": {
//!     "entries": {
//!       "webdav-backup": {
//!         "enabled": true,
//!         "env": {
//!           "WEBDAV_URL": "https://dav.example.com/dav/",
//!           "WEBDAV_USERNAME": "me@example.com",
//!           "WEBDAV_PASSWORD": "app-password"
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! An entry only contributes values if its `enabled` field is truthy.

use crate::path::{config_candidates, default_workspace_dir, NoWayHome};

use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, instrument};

/// Name of the skill entry holding WebDAV settings.
pub const SKILL_NAME: &str = "webdav-backup";

/// Environment variable naming the workspace directory to back up.
pub const WORKSPACE_VAR: &str = "OPENCLAW_WORKSPACE";

/// Environment variable naming the WebDAV base URL.
pub const URL_VAR: &str = "WEBDAV_URL";

/// Environment variable naming the WebDAV username.
pub const USERNAME_VAR: &str = "WEBDAV_USERNAME";

/// Environment variables naming the WebDAV password, in priority order.
pub const PASSWORD_VARS: [&str; 2] = ["WEBDAV_PASS", "WEBDAV_PASSWORD"];

/// Host application configuration layout.
///
/// Everything besides the skill entries is ignored.
#[derive(Default, Debug, PartialEq, Clone, Deserialize)]
pub struct HostConfig {
    /// Skill configuration section.
    #[serde(default)]
    pub skills: Skills,
}

impl HostConfig {
    /// Extract environment block of target skill entry.
    ///
    /// Returns `None` if the entry is missing, malformed, or not enabled.
    pub fn skill_env(&self, name: impl AsRef<str>) -> Option<SkillEnv> {
        let raw = self.skills.entries.get(name.as_ref())?;

        // INVARIANT: Entries of other skills may take any shape, so only the
        // target entry is ever deserialized.
        let entry: SkillEntry = match serde_json::from_value(raw.clone()) {
            Ok(entry) => entry,
            Err(error) => {
                debug!("skill entry {:?} is malformed: {error}", name.as_ref());
                return None;
            }
        };

        if !is_truthy(&entry.enabled) {
            debug!("skill entry {:?} is not enabled", name.as_ref());
            return None;
        }

        Some(entry.env)
    }
}

impl FromStr for HostConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data).map_err(ConfigError::Deserialize)
    }
}

/// Skill section of host configuration.
#[derive(Default, Debug, PartialEq, Clone, Deserialize)]
pub struct Skills {
    /// Skill entries keyed by skill name.
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
}

/// Single skill entry.
#[derive(Default, Debug, PartialEq, Clone, Deserialize)]
pub struct SkillEntry {
    /// Whether or not the skill is enabled.
    #[serde(default)]
    pub enabled: Value,

    /// Environment-variable-style settings of the skill.
    #[serde(default)]
    pub env: SkillEnv,
}

/// Key/value settings of a skill entry.
#[derive(Default, Debug, PartialEq, Clone, Deserialize)]
#[serde(transparent)]
pub struct SkillEnv(BTreeMap<String, Value>);

impl SkillEnv {
    /// Look up string value of target key.
    ///
    /// Values that are not JSON strings are treated as absent.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.0.get(key.as_ref()).and_then(Value::as_str)
    }

    /// Find first enabled `webdav-backup` entry among configuration files.
    ///
    /// Configuration files are visited in the order given. Files that do not
    /// exist, cannot be read, cannot be parsed, or lack an enabled entry are
    /// skipped without error.
    #[instrument(skip(paths), level = "debug")]
    pub fn discover(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Option<Self> {
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }

            let data = match fs::read_to_string(path) {
                Ok(data) => data,
                Err(error) => {
                    debug!("skip unreadable config {:?}: {error}", path.display());
                    continue;
                }
            };

            let host: HostConfig = match data.parse() {
                Ok(host) => host,
                Err(error) => {
                    debug!("skip unparsable config {:?}: {error}", path.display());
                    continue;
                }
            };

            if let Some(env) = host.skill_env(SKILL_NAME) {
                debug!("use skill entry from {:?}", path.display());
                return Some(env);
            }
        }

        None
    }
}

impl<K, V> FromIterator<(K, V)> for SkillEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), Value::String(value.into())))
                .collect(),
        )
    }
}

/// Determine truthiness of JSON value.
///
/// Follows the host's conventions: `null`, `false`, zero, and empty
/// strings, arrays, or objects are falsy. Everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(string) => !string.is_empty(),
        Value::Array(array) => !array.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}

/// Resolved WebDAV configuration.
///
/// Populated once at startup, and never modified afterwards.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of WebDAV destination folder.
    pub url: String,

    /// Username for basic authentication.
    pub username: String,

    /// Password for basic authentication.
    pub password: String,

    /// Workspace directory named by `OPENCLAW_WORKSPACE`, if set.
    pub workspace: Option<PathBuf>,
}

impl Config {
    /// Load configuration from process environment and host configuration.
    ///
    /// If the home directory cannot be determined, no configuration file is
    /// consulted.
    #[instrument(level = "debug")]
    pub fn load() -> Self {
        let skill = match config_candidates() {
            Ok(candidates) => SkillEnv::discover(candidates),
            Err(error) => {
                debug!("skip host configuration: {error}");
                None
            }
        };

        Self::resolve(|key| std::env::var(key).ok(), skill.as_ref())
    }

    /// Resolve configuration from explicit sources.
    ///
    /// Precedence for every field is environment variable, then skill entry,
    /// then empty string. Password lookup is `WEBDAV_PASS` env, then
    /// `WEBDAV_PASSWORD` env, then the same two keys in the skill entry. An
    /// environment variable that is set wins even if its value is empty.
    ///
    /// The workspace path is taken literally, except for a leading `~`.
    pub fn resolve(env: impl Fn(&str) -> Option<String>, skill: Option<&SkillEnv>) -> Self {
        let lookup = |keys: &[&str]| -> String {
            keys.iter()
                .find_map(|key| env(*key))
                .or_else(|| {
                    skill.and_then(|skill| {
                        keys.iter()
                            .find_map(|key| skill.get(*key))
                            .map(str::to_owned)
                    })
                })
                .unwrap_or_default()
        };

        let workspace = env(WORKSPACE_VAR)
            .map(|path| PathBuf::from(shellexpand::tilde(path.as_str()).into_owned()));

        Self {
            url: lookup(&[URL_VAR]),
            username: lookup(&[USERNAME_VAR]),
            password: lookup(&PASSWORD_VARS[..]),
            workspace,
        }
    }

    /// Determine workspace directory to back up.
    ///
    /// Falls back to `~/.openclaw/workspace` if `OPENCLAW_WORKSPACE` is unset.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NoWayHome`] if the fallback is needed, but the
    ///   home directory cannot be determined.
    pub fn workspace_dir(&self) -> Result<PathBuf> {
        match &self.workspace {
            Some(path) => Ok(path.clone()),
            None => Ok(default_workspace_dir()?),
        }
    }

    /// List settings that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (URL_VAR, &self.url),
            (USERNAME_VAR, &self.username),
            (PASSWORD_VARS[1], &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Check that URL, username, and password are all set.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Missing`] listing every empty setting.
    pub fn ensure_complete(&self) -> Result<()> {
        let fields = self.missing_fields();
        if !fields.is_empty() {
            return Err(ConfigError::Missing { fields });
        }

        info!("WebDAV URL: {}", self.url);
        info!("username: {}", self.username);
        Ok(())
    }
}

impl Debug for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("Config")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required WebDAV settings are empty.
    #[error("missing WebDAV configuration: {}", fields.join(", "))]
    Missing { fields: Vec<&'static str> },

    /// Failed to deserialize host configuration.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),

    /// Home directory cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
