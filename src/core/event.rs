//! A single logging call, as seen by layouts and appenders

use crate::core::level::Level;
use crate::core::value::LogValue;
use chrono::{DateTime, Local};

/// Call-site location captured with `#[track_caller]` at the logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// The location of the caller of the current `#[track_caller]` chain.
    #[must_use]
    #[track_caller]
    pub fn here() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// One qualifying logging call: everything a layout needs to render it.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub when: DateTime<Local>,
    pub message: String,
    pub args: Vec<LogValue>,
    /// Name of the logger the call was made on (not an alias target).
    pub logger: String,
    pub call_site: Option<CallSite>,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            when: Local::now(),
            message: message.into(),
            args: Vec::new(),
            logger: String::new(),
            call_site: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<LogValue>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, name: impl Into<String>) -> Self {
        self.logger = name.into();
        self
    }

    #[must_use]
    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    #[must_use]
    pub fn at(mut self, when: DateTime<Local>) -> Self {
        self.when = when;
        self
    }

    /// First error-like argument, if any: feeds `%error`/`%stack`/`%nstack`.
    #[must_use]
    pub fn first_error(&self) -> Option<(&str, Option<&str>)> {
        self.args.iter().find_map(|arg| match arg {
            LogValue::Error { message, stack } => Some((message.as_str(), stack.as_deref())),
            _ => None,
        })
    }
}
