//! Logging macros
//!
//! Thin wrappers over [`Logger::log`](crate::core::Logger::log) that turn
//! trailing expressions into [`LogValue`](crate::core::LogValue)
//! arguments.
//!
//! # Examples
//!
//! ```
//! use cluster_logger::prelude::*;
//! use cluster_logger::info;
//!
//! let registry = LoggerRegistry::new();
//! let logger = registry.get("web");
//!
//! info!(logger, "server started");
//! info!(logger, "listening", 8080);
//! ```

/// Log at an explicit level.
///
/// ```
/// # use cluster_logger::prelude::*;
/// # let registry = LoggerRegistry::new();
/// # let logger = registry.get("web");
/// use cluster_logger::log;
/// log!(logger, cluster_logger::core::level::WARN, "slow request", 1.5);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $logger.log($level, $msg, vec![$($crate::core::value::LogValue::from($arg)),*])
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::level::DEBUG, $msg $(, $arg)*)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::level::INFO, $msg $(, $arg)*)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::level::WARN, $msg $(, $arg)*)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::level::ERROR, $msg $(, $arg)*)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::level::FATAL, $msg $(, $arg)*)
    };
}
