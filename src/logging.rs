//! Logging context for a single run.
//!
//! Log output looks like `[INFO] - message`, with the level name colored when
//! stderr supports ANSI escapes. The level comes from `--log-level`, which
//! accepts the familiar names (`DEBUG`, `INFO`, `WARNING`, `ERROR`,
//! `CRITICAL`) or a numeric threshold in the same scale (`10`, `20`, ...).
//!
//! `tracing` has no level above `ERROR`, so critical messages are error events
//! sent to [`CRITICAL_TARGET`]. They print as `[CRITICAL]`, and a `CRITICAL`
//! threshold lets nothing else through.
//!
//! [`LogContext`] is built once at startup and installed as the default
//! dispatcher for the current thread via [`LogContext::enter`]; nothing
//! registers a process-global subscriber. `RUST_LOG`, when set, takes
//! precedence over the flag.

use colored::Colorize;
use std::fmt;
use std::str::FromStr;
use tracing::dispatcher::{self, DefaultGuard, Dispatch};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Target of critical messages.
pub const CRITICAL_TARGET: &str = "sync_uv_pre_commit::critical";

/// Verbosity threshold selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including trace output from external commands
    Trace,
    /// `DEBUG` / `10`
    Debug,
    /// `INFO` / `20`
    #[default]
    Info,
    /// `WARNING` / `30`
    Warning,
    /// `ERROR` / `40`
    Error,
    /// `CRITICAL` / `50`
    Critical,
}

impl LogLevel {
    /// Map a numeric threshold onto the nearest level at or above it.
    #[must_use]
    pub const fn from_number(level: i64) -> Self {
        match level {
            i64::MIN..=9 => Self::Trace,
            10 => Self::Debug,
            11..=20 => Self::Info,
            21..=30 => Self::Warning,
            31..=40 => Self::Error,
            _ => Self::Critical,
        }
    }

    /// The most verbose `tracing` level this threshold lets through.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }

    /// Event filter for this threshold.
    ///
    /// `CRITICAL` only admits events sent to [`CRITICAL_TARGET`].
    #[must_use]
    pub fn env_filter(self) -> EnvFilter {
        match self {
            Self::Critical => EnvFilter::new(format!("off,{CRITICAL_TARGET}=error")),
            level => EnvFilter::default().add_directive(level.filter().into()),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<i64>() {
            return Ok(Self::from_number(number));
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "TRACE" | "NOTSET" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(format!(
                "unknown log level '{s}' \
                 (expected DEBUG, INFO, WARNING, ERROR, CRITICAL or a number)"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// `[LEVEL] - message` event formatter.
struct LevelPrefixFormat;

impl<S, N> FormatEvent<S, N> for LevelPrefixFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = *event.metadata().level();
        let critical = event.metadata().target() == CRITICAL_TARGET;
        let name = match level {
            _ if critical => "CRITICAL",
            Level::TRACE => "TRACE",
            Level::DEBUG => "DEBUG",
            Level::INFO => "INFO",
            Level::WARN => "WARNING",
            _ => "ERROR",
        };
        if writer.has_ansi_escapes() {
            let colored = match level {
                _ if critical => name.red().bold(),
                Level::INFO => name.green(),
                Level::WARN => name.yellow(),
                Level::ERROR => name.red(),
                _ => name.cyan(),
            };
            write!(writer, "[{colored}] - ")?;
        } else {
            write!(writer, "[{name}] - ")?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Explicitly constructed logging configuration for one run.
pub struct LogContext {
    level: LogLevel,
    dispatch: Dispatch,
}

impl LogContext {
    /// Build a context logging to stderr at `level`.
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            level.env_filter()
        };

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
            .event_format(LevelPrefixFormat)
            .finish();

        Self {
            level,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// The dispatcher events are routed to.
    #[must_use]
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Install this context as the current thread's default dispatcher.
    ///
    /// Logging reverts when the returned guard is dropped.
    #[must_use = "logging stops when the guard is dropped"]
    pub fn enter(&self) -> DefaultGuard {
        dispatcher::set_default(&self.dispatch)
    }
}
