//! Logging for the dbsql crates
//!
//! Structured events go through `emit` and are printed to stderr by
//! `emit_term`. The `DBSQL_LOG` environment variable picks the level:
//!
//! - `off` (default): nothing is printed
//! - `error`, `warn`, `info`, `debug`: that level and above
//!
//! Events use `emit` templates, e.g. `info!("Executing: {sql}", sql: &sql)`.

use std::sync::Once;

// Re-export emit so the macros resolve from any crate
pub use emit;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "DBSQL_LOG";

static INIT: Once = Once::new();

/// Parsed value of `DBSQL_LOG`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Level(emit::Level),
    /// Unrecognized text; treated as `info`
    Unknown,
}

/// Map a `DBSQL_LOG` value to a level, case-insensitively
#[must_use]
pub fn parse_level(value: &str) -> LogLevel {
    match value.trim().to_lowercase().as_str() {
        "" | "off" => LogLevel::Off,
        "error" => LogLevel::Level(emit::Level::Error),
        "warn" => LogLevel::Level(emit::Level::Warn),
        "info" => LogLevel::Level(emit::Level::Info),
        "debug" => LogLevel::Level(emit::Level::Debug),
        _ => LogLevel::Unknown,
    }
}

/// Install the stderr emitter according to `DBSQL_LOG`
///
/// Call once at startup; later calls do nothing.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_default();
        let min = match parse_level(&value) {
            LogLevel::Off => return,
            LogLevel::Level(level) => level,
            LogLevel::Unknown => emit::Level::Info,
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        if parse_level(&value) == LogLevel::Unknown {
            emit::warn!("Unknown {env} value {value}, using info", env: LOG_ENV, value: &value);
        }

        // The runtime lives for the rest of the process.
        std::mem::forget(rt);
    });
}

pub use init_diagnostics as init;

/// Operations a user would want to see: statements run, files written
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Detail for debugging: row counts, intermediate values
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable problems and fallbacks
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that stop a task
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}
