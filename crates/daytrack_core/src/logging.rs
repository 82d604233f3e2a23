//! Rolling file logs for the daytrack core.
//!
//! The UI host decides when logging starts and where the files live;
//! core keeps exactly one process-wide logger and refuses conflicting
//! re-initialization. Events are single-line `key=value` records so the
//! host's diagnostics screen can filter them without a parser.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_BASENAME: &str = "daytrack";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 4;
const PANIC_SUMMARY_CHARS: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Verbosity accepted by [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            // The host settings screen historically sent "warning".
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unknown log level `{other}` (expected trace, debug, info, warn or error)"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ActiveLogger {
    level: LogLevel,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Starts file logging, creating `log_dir` if needed.
///
/// Repeating the call with the same `level` and `log_dir` is a no-op;
/// any attempt to reconfigure a live logger is rejected. Never panics.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = level.parse::<LogLevel>()?;
    let dir = resolve_log_dir(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start_logger(level, dir.clone()))?;
    if active.level != level || active.dir != dir {
        return Err(format!(
            "logging already active (level={} dir={}); restart the app to change it",
            active.level,
            active.dir.display()
        ));
    }
    Ok(())
}

/// Level and directory of the live logger, or `None` before init.
pub fn logging_status() -> Option<(LogLevel, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// Level used when the host does not pass one: chatty in dev builds,
/// quiet in release.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

fn resolve_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir must not be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be absolute, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn start_logger(level: LogLevel, dir: PathBuf) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&dir)
        .map_err(|err| format!("cannot create log dir `{}`: {err}", dir.display()))?;

    let handle = Logger::try_with_str(level.as_str())
        .map_err(|err| format!("logger rejected level `{level}`: {err}"))?
        .log_to_file(FileSpec::default().directory(&dir).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("logger start failed: {err}"))?;

    capture_panics();

    info!(
        "event=logging_start module=logging status=ok level={} dir={} version={} os={}",
        level,
        dir.display(),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        level,
        dir,
        _handle: handle,
    })
}

/// Records panics crossing the FFI boundary before the host sees them.
/// The payload can carry user text, so it is flattened and capped.
fn capture_panics() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let at = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error at={at} what={}",
            one_line(&payload, PANIC_SUMMARY_CHARS)
        );
        previous(panic_info);
    }));
}

fn one_line(value: &str, cap: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= cap {
        return flat;
    }
    let mut capped = flat.chars().take(cap).collect::<String>();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, one_line, resolve_log_dir, LogLevel};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("daytrack-logs-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn level_parses_aliases_and_rejects_garbage() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(err.contains("verbose"));
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_empty() {
        assert!(resolve_log_dir("   ").is_err());
        let err = resolve_log_dir("logs/dev").unwrap_err();
        assert!(err.contains("absolute"));
    }

    #[test]
    fn one_line_flattens_and_caps() {
        assert_eq!(one_line("a\nb\rc", 10), "a b c");
        let capped = one_line(&"x".repeat(50), 8);
        assert_eq!(capped, format!("{}...", "x".repeat(8)));
    }

    // One test covers init, idempotence and both conflict paths: the
    // logger is process-global, so these steps cannot run in parallel
    // tests.
    #[test]
    fn init_is_idempotent_and_refuses_reconfiguration() {
        let first = scratch_dir("first");
        let other = scratch_dir("other");
        let first_str = first.to_str().expect("utf-8 temp dir").to_string();
        let other_str = other.to_str().expect("utf-8 temp dir").to_string();

        init_logging("info", &first_str).expect("first init");
        init_logging("info", &first_str).expect("same settings repeat");

        let level_conflict = init_logging("debug", &first_str).unwrap_err();
        assert!(level_conflict.contains("already active"));
        let dir_conflict = init_logging("info", &other_str).unwrap_err();
        assert!(dir_conflict.contains("already active"));

        let (level, dir) = logging_status().expect("logger is live");
        assert_eq!(level, LogLevel::Info);
        assert_eq!(dir, first);
    }
}
