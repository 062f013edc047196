//! Console appender
//!
//! Direct synchronous print through the configured layout; no queueing
//! and no rotation concerns.

use crate::core::appender::Appender;
use crate::core::error::Result;
use crate::core::event::LogEvent;
use crate::core::level::Level;
use crate::forward::ForwardPayload;
use crate::layout::Layout;
use std::io::Write;

pub struct ConsoleAppender {
    name: String,
    min_level: Level,
    layout: Layout,
}

impl ConsoleAppender {
    pub fn new(name: impl Into<String>, min_level: Level, layout: Layout) -> Self {
        Self {
            name: name.into(),
            min_level,
            layout,
        }
    }
}

impl Appender for ConsoleAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        println!("{}", self.layout.render(event).trim_end_matches('\n'));
        Ok(())
    }

    fn append_forwarded(&self, payload: &ForwardPayload) -> Result<()> {
        println!("{}", self.layout.render_payload(payload).trim_end_matches('\n'));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.flush()
    }
}
