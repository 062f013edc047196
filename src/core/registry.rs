//! Logger and appender registry
//!
//! One registry owns one configuration lifecycle: `configure` validates a
//! whole document, builds the replacement appender set, closes the old
//! one, and swaps; `reset` drains everything. Named loggers are handles
//! onto the registry, so multiple independent registries can coexist (and
//! do, in tests).

use crate::appenders::{
    ConsoleAppender, FileAppender, ForwardAppender, ForwardMode, RotateFileOptions,
    RotatingFileAppender,
};
use crate::config::{build_layout, AppenderConfig, Config};
use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::event::{CallSite, LogEvent};
use crate::core::level::{Level, Levels};
use crate::core::logger::Logger;
use crate::core::value::LogValue;
use crate::forward::{ForwardMessage, Transport};
use crate::layout::{LayoutContext, PatternLayout};
use chrono::Local;
use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Alias resolution gives up after this many hops and uses the last
/// logger reached.
pub const MAX_REFER_HOPS: usize = 10;

/// Unknown logger names fall back to this entry when it is configured.
pub const DEFAULT_LOGGER: &str = "default";

/// Constructor for one appender type tag. External collaborators register
/// their own alongside the built-in `console`/`file`/`rotate_file` set.
pub type AppenderCtor = Arc<
    dyn Fn(&str, &AppenderConfig, &Arc<LayoutContext>) -> Result<Arc<dyn Appender>> + Send + Sync,
>;

#[derive(Debug, Clone)]
pub(crate) struct LoggerRoute {
    pub(crate) level: Level,
    pub(crate) appenders: Vec<String>,
    pub(crate) refer: Option<String>,
}

pub(crate) struct Inner {
    pub(crate) levels: Arc<Levels>,
    pub(crate) context: Arc<LayoutContext>,
    pub(crate) appenders: HashMap<String, Arc<dyn Appender>>,
    pub(crate) loggers: HashMap<String, LoggerRoute>,
    constructors: HashMap<String, AppenderCtor>,
    transport: Option<Arc<dyn Transport>>,
}

/// Process-role-aware registry of appenders and loggers by name.
#[derive(Clone)]
pub struct LoggerRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl LoggerRegistry {
    /// A master-role registry: file destinations open real files.
    #[must_use]
    pub fn new() -> Self {
        let levels = Arc::new(Levels::default());
        let context = Arc::new(LayoutContext::new(Arc::clone(&levels)));
        Self {
            inner: Arc::new(RwLock::new(Inner {
                levels,
                context,
                appenders: HashMap::new(),
                loggers: HashMap::new(),
                constructors: builtin_constructors(),
                transport: None,
            })),
        }
    }

    /// A worker-role registry: shared file destinations forward over the
    /// given transport instead of opening files.
    #[must_use]
    pub fn worker(transport: Arc<dyn Transport>) -> Self {
        let registry = Self::new();
        registry.inner.write().transport = Some(transport);
        registry
    }

    /// Register a constructor for a custom appender type tag.
    pub fn register_appender_kind(&self, kind: impl Into<String>, ctor: AppenderCtor) {
        self.inner.write().constructors.insert(kind.into(), ctor);
    }

    /// Apply a configuration document.
    ///
    /// Everything is validated and the replacement appender set fully
    /// built before the old one is drained and swapped out; on error the
    /// previous configuration stays in effect.
    pub fn configure(&self, config: &Config) -> Result<()> {
        let levels = match &config.levels {
            Some(names) => Arc::new(Levels::custom(names.clone())?),
            None => Arc::new(Levels::default()),
        };
        let context = Arc::new(
            LayoutContext::new(Arc::clone(&levels))
                .with_basedir(config.basedir.clone())
                .with_default_pattern(config.pattern.clone()),
        );

        let mut inner = self.inner.write();

        let mut appenders: HashMap<String, Arc<dyn Appender>> = HashMap::new();
        let mut failed = None;
        for (name, appender_config) in &config.appenders {
            match build_appender(&inner, name, appender_config, &context) {
                Ok(appender) => {
                    appenders.insert(name.clone(), appender);
                }
                Err(e) => {
                    failed = Some(e);
                    break;
                }
            }
        }
        let routes = match failed {
            None => build_routes(config, &levels, &appenders),
            Some(e) => Err(e),
        };
        let loggers = match routes {
            Ok(loggers) => loggers,
            Err(e) => {
                // drain appenders built for the failed attempt
                for appender in appenders.values() {
                    let _ = appender.close();
                }
                return Err(e);
            }
        };

        // drain the outgoing sinks before the swap
        for appender in inner.appenders.values() {
            if let Err(e) = appender.close() {
                eprintln!("[logger] failed to close appender '{}': {e}", appender.name());
            }
        }

        inner.levels = levels;
        inner.context = context;
        inner.appenders = appenders;
        inner.loggers = loggers;
        Ok(())
    }

    /// Close every appender and return to the unconfigured state.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        for appender in inner.appenders.values() {
            if let Err(e) = appender.close() {
                eprintln!("[logger] failed to close appender '{}': {e}", appender.name());
            }
        }
        inner.appenders.clear();
        inner.loggers.clear();
        let levels = Arc::new(Levels::default());
        inner.context = Arc::new(LayoutContext::new(Arc::clone(&levels)));
        inner.levels = levels;
    }

    /// Get a named logger handle. Always succeeds; an unconfigured name
    /// dispatches through the `default` entry when one exists and is
    /// otherwise inert.
    #[must_use]
    pub fn get(&self, name: impl Into<String>) -> Logger {
        Logger::new(name.into(), Arc::clone(&self.inner))
    }

    /// Look a level up by name in the active table.
    #[must_use]
    pub fn level(&self, name: &str) -> Option<Level> {
        self.inner.read().levels.parse(name)
    }

    /// Flush every appender.
    pub fn flush(&self) {
        let inner = self.inner.read();
        for appender in inner.appenders.values() {
            if let Err(e) = appender.flush() {
                eprintln!("[logger] failed to flush appender '{}': {e}", appender.name());
            }
        }
    }

    /// Spawn the master-side listener for records forwarded by workers.
    ///
    /// The listener runs until every transport feeding `rx` is dropped.
    #[must_use]
    pub fn listen(&self, rx: Receiver<ForwardMessage>) -> ForwardListener {
        let inner = Arc::clone(&self.inner);
        let handle = thread::Builder::new()
            .name("log-forward-listener".to_string())
            .spawn(move || {
                for message in rx {
                    dispatch_forwarded(&inner, message);
                }
            })
            .expect("spawn forward listener thread");
        ForwardListener {
            handle: Some(handle),
        }
    }

    /// Dispatch one forwarded message as the listener would.
    pub fn dispatch_forwarded(&self, message: ForwardMessage) {
        dispatch_forwarded(&self.inner, message);
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn dispatch_forwarded(inner: &Arc<RwLock<Inner>>, message: ForwardMessage) {
    let ForwardMessage::Log { appender, payload } = message;
    let guard = inner.read();
    // unknown appender names are dropped silently: error-logging here
    // could feed the logging system its own failures
    if let Some(target) = guard.appenders.get(&appender) {
        if let Err(e) = target.append_forwarded(&payload) {
            eprintln!("[logger] forwarded append to '{appender}' failed: {e}");
        }
    }
}

/// Handle on the master-side listener thread.
pub struct ForwardListener {
    handle: Option<JoinHandle<()>>,
}

impl ForwardListener {
    /// Wait for the listener to finish; it does once every worker
    /// transport is gone.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn build_routes(
    config: &Config,
    levels: &Levels,
    appenders: &HashMap<String, Arc<dyn Appender>>,
) -> Result<HashMap<String, LoggerRoute>> {
    let mut loggers = HashMap::new();
    for (name, logger_config) in &config.loggers {
        let level = match &logger_config.level {
            Some(level_name) => levels.parse(level_name).ok_or_else(|| {
                LoggerError::config(
                    format!("loggers.{name}"),
                    format!("unknown level '{level_name}'"),
                )
            })?,
            None => Level(0),
        };
        for appender_name in &logger_config.appenders {
            if !appenders.contains_key(appender_name) {
                return Err(LoggerError::config(
                    format!("loggers.{name}"),
                    format!("unknown appender '{appender_name}'"),
                ));
            }
        }
        loggers.insert(
            name.clone(),
            LoggerRoute {
                level,
                appenders: logger_config.appenders.clone(),
                refer: logger_config.refer.clone(),
            },
        );
    }
    Ok(loggers)
}

fn min_level_of(
    name: &str,
    config: &AppenderConfig,
    context: &Arc<LayoutContext>,
) -> Result<Level> {
    match &config.level {
        Some(level_name) => context.levels.parse(level_name).ok_or_else(|| {
            LoggerError::config(
                format!("appenders.{name}"),
                format!("unknown level '{level_name}'"),
            )
        }),
        None => Ok(Level(0)),
    }
}

fn build_appender(
    inner: &Inner,
    name: &str,
    config: &AppenderConfig,
    context: &Arc<LayoutContext>,
) -> Result<Arc<dyn Appender>> {
    if let Some(transport) = &inner.transport {
        match config.kind.as_str() {
            // workers never open shared file destinations
            "file" | "rotate_file" => {
                let min_level = min_level_of(name, config, context)?;
                let layout = build_layout(config.layout.as_ref(), context);
                return Ok(Arc::new(ForwardAppender::new(
                    name,
                    min_level,
                    ForwardMode::Line(layout),
                    Arc::clone(transport),
                )));
            }
            "worker" => {
                let min_level = min_level_of(name, config, context)?;
                let pattern = context
                    .fallback_pattern(config.layout.as_ref().and_then(|l| l.pattern.as_deref()));
                let layout = PatternLayout::new(pattern, Arc::clone(context));
                return Ok(Arc::new(ForwardAppender::new(
                    name,
                    min_level,
                    ForwardMode::Fields(layout),
                    Arc::clone(transport),
                )));
            }
            _ => {}
        }
    } else if config.kind == "worker" {
        return Err(LoggerError::config(
            format!("appenders.{name}"),
            "'worker' appenders require a worker-role registry",
        ));
    }

    let ctor = inner.constructors.get(&config.kind).ok_or_else(|| {
        LoggerError::config(
            format!("appenders.{name}"),
            format!("unknown appender type '{}'", config.kind),
        )
    })?;
    ctor(name, config, context)
}

fn builtin_constructors() -> HashMap<String, AppenderCtor> {
    let mut constructors: HashMap<String, AppenderCtor> = HashMap::new();

    constructors.insert(
        "console".to_string(),
        Arc::new(|name, config, context| {
            let min_level = min_level_of(name, config, context)?;
            let layout = build_layout(config.layout.as_ref(), context);
            Ok(Arc::new(ConsoleAppender::new(name, min_level, layout)))
        }),
    );

    constructors.insert(
        "file".to_string(),
        Arc::new(|name, config, context| {
            let min_level = min_level_of(name, config, context)?;
            let layout = build_layout(config.layout.as_ref(), context);
            let file_name = config.file_name.as_ref().ok_or_else(|| {
                LoggerError::config(format!("appenders.{name}"), "missing file_name")
            })?;
            let directory = config
                .directory
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            let appender = FileAppender::new(
                name,
                min_level,
                layout,
                directory.join(file_name),
                config.mode.unwrap_or(0o644),
            )?;
            Ok(Arc::new(appender))
        }),
    );

    constructors.insert(
        "rotate_file".to_string(),
        Arc::new(|name, config, context| {
            let min_level = min_level_of(name, config, context)?;
            let layout = build_layout(config.layout.as_ref(), context);
            let defaults = RotateFileOptions::default();
            let options = RotateFileOptions {
                directory: config.directory.clone().unwrap_or(defaults.directory),
                file_name: config
                    .file_name
                    .clone()
                    .ok_or_else(|| {
                        LoggerError::config(format!("appenders.{name}"), "missing file_name")
                    })?,
                file_pattern: config.file_pattern.clone().unwrap_or(defaults.file_pattern),
                interval_ms: config.interval.unwrap_or(defaults.interval_ms),
                mode: config.mode.unwrap_or(defaults.mode),
                symlink: config.symlink.as_ref().map(|s| s.current.clone()),
            };
            let appender = RotatingFileAppender::new(name, min_level, layout, options)?;
            Ok(Arc::new(appender))
        }),
    );

    constructors
}

/// Resolve a logger name to its effective route, following `refer`
/// aliases up to [`MAX_REFER_HOPS`]; a cycle or a dangling alias stops at
/// the last logger reached.
pub(crate) fn resolve_route<'a>(inner: &'a Inner, name: &str) -> Option<&'a LoggerRoute> {
    let mut route = inner
        .loggers
        .get(name)
        .or_else(|| inner.loggers.get(DEFAULT_LOGGER))?;
    for _ in 0..MAX_REFER_HOPS {
        let Some(next) = &route.refer else { break };
        match inner.loggers.get(next) {
            Some(target) => route = target,
            None => break,
        }
    }
    Some(route)
}

/// Fan one qualifying call out to the resolved logger's appenders, in
/// attachment order. Never raises into the caller.
pub(crate) fn dispatch(
    inner: &Inner,
    logger_name: &str,
    level: Level,
    message: String,
    args: Vec<LogValue>,
    call_site: CallSite,
) {
    let Some(route) = resolve_route(inner, logger_name) else {
        return;
    };
    if level < route.level {
        return;
    }

    let event = LogEvent {
        level,
        when: Local::now(),
        message,
        args,
        logger: logger_name.to_string(),
        call_site: Some(call_site),
    };

    for appender_name in &route.appenders {
        let Some(appender) = inner.appenders.get(appender_name) else {
            continue;
        };
        if appender.min_level() <= level {
            if let Err(e) = appender.append(&event) {
                // one failing appender never blocks the others
                eprintln!("[logger] appender '{appender_name}' failed: {e}");
            }
        }
    }
}
