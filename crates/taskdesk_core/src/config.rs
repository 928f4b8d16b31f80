//! Application configuration loaded from `config.toml`.
//!
//! # Responsibility
//! - Locate the per-user config file and parse it with serde.
//! - Resolve defaults for the database file, log directory, log level and
//!   notification timeout.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - Unknown keys are rejected so typos do not silently fall back.
//! - Resolved paths are absolute.

use crate::logging::{default_log_level, parse_level};
use log::LevelFilter;
use crate::notify::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "taskdesk";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "tasks.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    /// Platform does not expose a config/data directory.
    NoPlatformDir(&'static str),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    RelativePath {
        key: &'static str,
        path: PathBuf,
    },
    InvalidValue {
        key: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPlatformDir(kind) => write!(f, "no platform {kind} directory available"),
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::RelativePath { key, path } => write!(
                f,
                "config key `{key}` must be an absolute path, got `{}`",
                path.display()
            ),
            Self::InvalidValue { key, message } => {
                write!(f, "invalid value for config key `{key}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// On-disk configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Fully resolved settings used at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LevelFilter,
    pub notification_timeout: Duration,
}

impl AppConfig {
    /// Loads the per-user config file, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Loads `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves defaults against the platform data directory.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let data_dir = || -> Result<PathBuf, ConfigError> {
            dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoPlatformDir("data"))
        };
        self.resolve_with(data_dir)
    }

    fn resolve_with(
        &self,
        data_dir: impl Fn() -> Result<PathBuf, ConfigError>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let database_path = match &self.database_path {
            Some(path) => absolute("database_path", path)?,
            None => data_dir()?.join(DB_FILE_NAME),
        };
        let log_dir = match &self.log_dir {
            Some(path) => absolute("log_dir", path)?,
            None => data_dir()?.join(LOG_DIR_NAME),
        };
        let log_level = match &self.log_level {
            Some(level) => parse_level(level).ok_or_else(|| ConfigError::InvalidValue {
                key: "log_level",
                message: format!("unknown level `{level}`; expected trace|debug|info|warn|error"),
            })?,
            None => default_log_level(),
        };
        if self.notification.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "notification.timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(ResolvedConfig {
            database_path,
            log_dir,
            log_level,
            notification_timeout: Duration::from_secs(self.notification.timeout_secs),
        })
    }
}

/// Location of the per-user config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformDir("config"))
}

fn absolute(key: &'static str, path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.is_absolute() {
        return Err(ConfigError::RelativePath {
            key,
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}
