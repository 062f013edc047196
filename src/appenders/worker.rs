//! Worker-side forwarding appenders
//!
//! On a worker-role registry, shared file destinations are stand-ins
//! that transmit to the master instead of touching the filesystem. Send
//! failures are swallowed: a forwarding failure must never crash the
//! worker or raise into application code.

use crate::core::appender::Appender;
use crate::core::error::Result;
use crate::core::event::LogEvent;
use crate::core::level::Level;
use crate::forward::{ForwardMessage, ForwardPayload, Transport};
use crate::layout::{Layout, PatternLayout};
use std::sync::Arc;

/// How this stub renders before transmitting.
pub enum ForwardMode {
    /// Render the full line with the appender's layout; the master writes
    /// it as-is.
    Line(Layout),
    /// Object-mode render: ship the field map, the master renders it with
    /// its own layout.
    Fields(PatternLayout),
}

pub struct ForwardAppender {
    name: String,
    min_level: Level,
    mode: ForwardMode,
    transport: Arc<dyn Transport>,
}

impl ForwardAppender {
    pub fn new(
        name: impl Into<String>,
        min_level: Level,
        mode: ForwardMode,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            name: name.into(),
            min_level,
            mode,
            transport,
        }
    }
}

impl Appender for ForwardAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let message = match &self.mode {
            ForwardMode::Line(layout) => ForwardMessage::line(&self.name, layout.render(event)),
            ForwardMode::Fields(layout) => {
                ForwardMessage::fields(&self.name, layout.render_object(event))
            }
        };
        let _ = self.transport.send(&message);
        Ok(())
    }

    fn append_forwarded(&self, payload: &ForwardPayload) -> Result<()> {
        // already in transit form; pass it along unchanged
        let message = ForwardMessage::Log {
            appender: self.name.clone(),
            payload: payload.clone(),
        };
        let _ = self.transport.send(&message);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
