//! Rolling file logs for a TaskDesk run.
//!
//! Events are single `key=value` lines with ids, counts and paths. Task
//! titles never reach the log files, panic payloads included.

use crate::config::ResolvedConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_BASENAME: &str = "taskdesk";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_SNIPPET_CHARS: usize = 160;

static ACTIVE_LOG: OnceCell<ActiveLog> = OnceCell::new();

struct ActiveLog {
    level: LevelFilter,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    RelativeDir(PathBuf),
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// A second start asked for a different level or directory.
    AlreadyActive {
        level: LevelFilter,
        log_dir: PathBuf,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeDir(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CreateDir { path, source } => {
                write!(f, "cannot create log directory `{}`: {source}", path.display())
            }
            Self::Backend(err) => write!(f, "logger failed to start: {err}"),
            Self::AlreadyActive { level, log_dir } => write!(
                f,
                "logging already active at level {level} in `{}`",
                log_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts file logging for `config`.
///
/// Calling it again with the same level and directory is a no-op.
pub fn init_logging(config: &ResolvedConfig) -> Result<(), LoggingError> {
    if !config.log_dir.is_absolute() {
        return Err(LoggingError::RelativeDir(config.log_dir.clone()));
    }

    let active = ACTIVE_LOG.get_or_try_init(|| start_file_logger(config))?;
    if active.level != config.log_level || active.log_dir != config.log_dir {
        return Err(LoggingError::AlreadyActive {
            level: active.level,
            log_dir: active.log_dir.clone(),
        });
    }
    Ok(())
}

fn start_file_logger(config: &ResolvedConfig) -> Result<ActiveLog, LoggingError> {
    let log_dir = config.log_dir.clone();
    std::fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.clone(),
        source,
    })?;

    let handle = Logger::with(LogSpecification::builder().default(config.log_level).build())
        .log_to_file(
            FileSpec::default()
                .directory(log_dir.as_path())
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    log_panics_to_file();

    info!(
        "event=logging_init module=core status=ok version={} level={} log_dir={} db_path={}",
        env!("CARGO_PKG_VERSION"),
        config.log_level,
        log_dir.display(),
        config.database_path.display()
    );

    Ok(ActiveLog {
        level: config.log_level,
        log_dir,
        _handle: handle,
    })
}

/// Build-mode default: `debug` for debug builds, `info` for release.
pub(crate) fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Parses a config level name. `off` is refused, `warning` means `warn`.
pub(crate) fn parse_level(raw: &str) -> Option<LevelFilter> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    raw.parse::<LevelFilter>()
        .ok()
        .filter(|level| *level != LevelFilter::Off)
}

// Runs once, from inside the logger's one-time start.
fn log_panics_to_file() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            flatten_payload(payload_text(panic_info.payload()), PANIC_SNIPPET_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn payload_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return *text;
    }
    payload
        .downcast_ref::<String>()
        .map_or("<non-string payload>", String::as_str)
}

/// Collapses whitespace to single spaces and keeps at most `max_chars`.
fn flatten_payload(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
