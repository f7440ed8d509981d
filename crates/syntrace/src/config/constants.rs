use crate::config::{LogFormat, LogSpanEvents};

/// The default value for `verbose`.
pub const DEFAULT_VERBOSE: bool = false;

/// The default value for `log-format`.
pub const DEFAULT_LOG_FORMAT: LogFormat = LogFormat::Pretty;

/// The default value for `log-span-events`.
pub const DEFAULT_LOG_SPAN_EVENTS: LogSpanEvents = LogSpanEvents::Off;

/// The default value for `log-filter`.
pub const DEFAULT_LOG_FILTER: &str = "syntrace=debug";

/// The default value for `drop-privileges`.
///
/// The library does not drop privileges by default but the command line tool does.
pub const DEFAULT_DROP_PRIVILEGES: bool = true;
