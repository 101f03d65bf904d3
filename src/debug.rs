//! Logging bridge for the icon-font binary.
//!
//! Routes every `log::info!()` etc. to stderr as
//! `[timestamp] [LEVEL] [target] message` lines. When `ICON_FONT_LOG_FILE`
//! is set, the same lines are also appended to that file.
//!
//! Level precedence: `--log-level` CLI flag, then the `ICON_FONT_LOG`
//! environment variable, then the config file's `log_level` (applied after
//! the config is loaded via [`apply_config_level`]).

use icon_font_config::LogLevel;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "ICON_FONT_LOG";
/// Environment variable naming an additional log file.
pub const LOG_FILE_ENV: &str = "ICON_FONT_LOG_FILE";

/// Where the level currently in effect came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LevelSource {
    Default,
    Config,
    Env,
    Cli,
}

struct BridgeState {
    source: LevelSource,
    file: Option<File>,
}

struct LogBridge {
    state: Mutex<BridgeState>,
}

impl LogBridge {
    fn write_line(&self, line: &str) {
        // Logging must never fail the caller; write errors are dropped.
        let _ = std::io::stderr().write_all(line.as_bytes());
        let mut state = self.state.lock();
        if let Some(ref mut file) = state.file {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_str = match record.level() {
            log::Level::Error => "ERROR",
            log::Level::Warn => "WARN ",
            log::Level::Info => "INFO ",
            log::Level::Debug => "DEBUG",
            log::Level::Trace => "TRACE",
        };
        self.write_line(&format!(
            "[{}] [{}] [{}] {}\n",
            get_timestamp(),
            level_str,
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(ref mut file) = self.state.lock().file {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn open_log_file() -> Option<File> {
    let path = std::env::var_os(LOG_FILE_ENV)?;
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(mut file) => {
            let _ = writeln!(
                file,
                "\n{}\nicon-font session started at {}\n{}",
                "=".repeat(80),
                get_timestamp(),
                "=".repeat(80)
            );
            Some(file)
        }
        Err(e) => {
            eprintln!(
                "icon-font: cannot open log file {}: {}",
                path.to_string_lossy(),
                e
            );
            None
        }
    }
}

fn env_level() -> Option<LevelFilter> {
    let value = std::env::var(LOG_LEVEL_ENV).ok()?;
    match value.parse::<LogLevel>() {
        Ok(level) => Some(level.to_level_filter()),
        Err(e) => {
            eprintln!("icon-font: ignoring {LOG_LEVEL_ENV}: {e}");
            None
        }
    }
}

/// Install the log bridge.
///
/// `cli_level` is the `--log-level` flag, if given. Calling this more than
/// once has no further effect.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let (level, source) = match (cli_level, env_level()) {
        (Some(level), _) => (level, LevelSource::Cli),
        (None, Some(level)) => (level, LevelSource::Env),
        (None, None) => (LevelFilter::Info, LevelSource::Default),
    };

    let mut installed = false;
    let bridge = BRIDGE.get_or_init(|| {
        installed = true;
        LogBridge {
            state: Mutex::new(BridgeState {
                source,
                file: open_log_file(),
            }),
        }
    });
    if installed && log::set_logger(bridge).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the config file's level unless the CLI or environment set one.
pub fn apply_config_level(level: LogLevel) {
    let Some(bridge) = BRIDGE.get() else {
        return;
    };
    let mut state = bridge.state.lock();
    if state.source <= LevelSource::Config {
        state.source = LevelSource::Config;
        log::set_max_level(level.to_level_filter());
    }
}
