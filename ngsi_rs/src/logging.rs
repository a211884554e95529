//! Logging setup.
//!
//! The subscriber is installed once at process start with an `error` filter.
//! After global flags are parsed the filter follows the resolved `--stderr`
//! level, unless `NGSI_LOG` is set, in which case the environment wins.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::error::NgsiError;

/// Environment variable overriding every other log level source.
pub const LOG_ENV: &str = "NGSI_LOG";

type Reloader = Box<dyn Fn(EnvFilter) + Send + Sync>;

static RELOAD: OnceLock<Reloader> = OnceLock::new();

/// Level accepted by `--stderr` and `--syslog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Err,
    Info,
    Debug,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Err => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = NgsiError;

    /// Case-insensitive; a `log` prefix is ignored (`LogInfo` == `info`).
    fn from_str(s: &str) -> Result<Self, NgsiError> {
        let lower = s.to_lowercase();
        let name = match lower.strip_prefix("log") {
            Some(rest) if !rest.is_empty() => rest,
            _ => lower.as_str(),
        };
        match name {
            "off" => Ok(LogLevel::Off),
            "err" => Ok(LogLevel::Err),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(NgsiError::new(
                "LogLevel",
                1,
                format!("unknown LogLevel: {}", name),
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Off => "off",
            LogLevel::Err => "err",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init() {
    let from_env = EnvFilter::try_from_env(LOG_ENV).ok();
    let env_wins = from_env.is_some();
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(LogLevel::Err.directive()));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .with_filter_reloading();
    let handle = builder.reload_handle();

    if builder.try_init().is_ok() && !env_wins {
        let _ = RELOAD.set(Box::new(move |filter| {
            let _ = handle.reload(filter);
        }));
    }
}

/// Follow the level resolved from flags and previous args.
pub fn set_stderr_level(level: LogLevel) {
    if let Some(reload) = RELOAD.get() {
        reload(EnvFilter::new(level.directive()));
    }
}
