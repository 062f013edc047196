//! # Cluster Logger
//!
//! A process-wide logging facility for multi-process server applications:
//! a master process owns the durable log outputs, worker processes
//! forward their records into the same outputs.
//!
//! ## Features
//!
//! - **Pattern layouts**: `%<name>` templates compiled once into reusable
//!   token pipelines, plus a JSON layout sharing the same formatters
//! - **Rotating files**: an ordered, backpressure-aware write queue that
//!   renames the active file onto a time-bucketed archive name without
//!   losing or duplicating lines
//! - **Worker forwarding**: workers render and transmit; the master
//!   funnels forwarded lines into the same single-consumer write queues
//! - **Named loggers**: per-logger thresholds, appender sets, and
//!   bounded `refer` aliasing

pub mod appenders;
pub mod config;
pub mod core;
pub mod forward;
pub mod layout;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, RotatingFileAppender};
    pub use crate::config::Config;
    pub use crate::core::{
        Appender, CallSite, Level, Levels, LogEvent, LogValue, Logger, LoggerError,
        LoggerRegistry, Result, DEBUG, ERROR, FATAL, INFO, WARN,
    };
    pub use crate::forward::{ForwardMessage, ForwardPayload, Transport};
    pub use crate::layout::{Layout, LayoutContext};
}

pub use crate::appenders::{ConsoleAppender, FileAppender, RotateFileOptions, RotatingFileAppender};
pub use crate::config::Config;
pub use crate::core::{
    Appender, CallSite, Level, Levels, LogEvent, LogValue, Logger, LoggerError, LoggerRegistry,
    Result, DEBUG, ERROR, FATAL, INFO, WARN,
};
pub use crate::forward::{channel, ChannelTransport, ForwardMessage, ForwardPayload, Transport};
pub use crate::layout::{
    ColorTable, CompiledPattern, Layout, LayoutContext, PatternLayout, DEFAULT_PATTERN,
};
