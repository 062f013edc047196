//! Appender trait for log output destinations

use crate::core::error::Result;
use crate::core::event::LogEvent;
use crate::core::level::Level;
use crate::forward::ForwardPayload;

/// A named sink with its own minimum level and layout.
///
/// Appenders are shared between the dispatcher and the master-side
/// forwarding listener, so all operations take `&self`; implementations
/// provide their own interior mutability.
pub trait Appender: Send + Sync {
    fn name(&self) -> &str;

    /// This appender's own minimum level; the dispatcher skips the
    /// appender for calls below it.
    fn min_level(&self) -> Level;

    /// Render and emit a locally-originated event.
    fn append(&self, event: &LogEvent) -> Result<()>;

    /// Emit a payload forwarded from a worker process.
    fn append_forwarded(&self, payload: &ForwardPayload) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Drain and close the sink. Called when configuration replaces the
    /// appender and on registry reset.
    fn close(&self) -> Result<()>;
}
