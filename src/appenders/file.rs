//! Single-file appender
//!
//! A plain append-mode stream with no rotation: writes happen
//! synchronously under an internal lock, one line at a time.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::event::LogEvent;
use crate::core::level::Level;
use crate::forward::ForwardPayload;
use crate::layout::Layout;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    name: String,
    min_level: Level,
    layout: Layout,
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileAppender {
    /// Open the file at configuration time so path problems surface as
    /// configuration errors, not on the first write.
    pub fn new(
        name: impl Into<String>,
        min_level: Level,
        layout: Layout,
        path: impl Into<PathBuf>,
        mode: u32,
    ) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation(
                        "create log directory",
                        format!("Failed to create '{}'", parent.display()),
                        e,
                    )
                })?;
            }
        }
        let file = open_append(&path, mode)?;

        Ok(Self {
            name: name.into(),
            min_level,
            layout,
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    fn write_line(&self, mut line: String) -> Result<()> {
        if !line.ends_with('\n') {
            line.push('\n');
        }
        let mut guard = self.writer.lock();
        let writer = guard
            .as_mut()
            .ok_or_else(|| LoggerError::writer("file appender closed"))?;
        writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Failed to write log entry: {e}"),
            )
        })
    }
}

fn open_append(path: &Path, mode: u32) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path).map_err(|e| {
        LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {e}"))
    })
}

impl Appender for FileAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        self.write_line(self.layout.render(event))
    }

    fn append_forwarded(&self, payload: &ForwardPayload) -> Result<()> {
        self.write_line(self.layout.render_payload(payload))
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.writer.lock().as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if let Some(mut writer) = self.writer.lock().take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
