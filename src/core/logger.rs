//! Named logger handles
//!
//! A `Logger` is a lightweight handle onto its registry: it resolves its
//! route (threshold, appender set, aliasing) at every call, so
//! reconfiguration takes effect immediately. Logging calls never return
//! errors and never panic into application code.

use crate::core::event::CallSite;
use crate::core::level::{Level, DEBUG, ERROR, FATAL, INFO, WARN};
use crate::core::registry::{dispatch, resolve_route, Inner};
use crate::core::value::LogValue;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    name: String,
    inner: Arc<RwLock<Inner>>,
}

impl Logger {
    pub(crate) fn new(name: String, inner: Arc<RwLock<Inner>>) -> Self {
        Self { name, inner }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Would a call at `level` reach any appender threshold check?
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        let inner = self.inner.read();
        resolve_route(&inner, &self.name).is_some_and(|route| level >= route.level)
    }

    /// Log at an explicit level with extra arguments.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>, args: Vec<LogValue>) {
        let call_site = CallSite::here();
        let inner = self.inner.read();
        dispatch(&inner, &self.name, level, message.into(), args, call_site);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(DEBUG, message, Vec::new());
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(INFO, message, Vec::new());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(WARN, message, Vec::new());
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(ERROR, message, Vec::new());
    }

    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(FATAL, message, Vec::new());
    }

    #[track_caller]
    pub fn debug_with(&self, message: impl Into<String>, args: Vec<LogValue>) {
        self.log(DEBUG, message, args);
    }

    #[track_caller]
    pub fn info_with(&self, message: impl Into<String>, args: Vec<LogValue>) {
        self.log(INFO, message, args);
    }

    #[track_caller]
    pub fn warn_with(&self, message: impl Into<String>, args: Vec<LogValue>) {
        self.log(WARN, message, args);
    }

    #[track_caller]
    pub fn error_with(&self, message: impl Into<String>, args: Vec<LogValue>) {
        self.log(ERROR, message, args);
    }

    #[track_caller]
    pub fn fatal_with(&self, message: impl Into<String>, args: Vec<LogValue>) {
        self.log(FATAL, message, args);
    }
}
