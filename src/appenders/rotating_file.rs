//! Rotating file appender
//!
//! The active file keeps a fixed "live" name. When a write's rotation
//! bucket passes the file's bucket, the consumer closes the stream,
//! renames the file onto a time-bucketed archive name, reopens a fresh
//! stream, and only then writes the pending line. All of this happens on
//! the appender's single queue consumer, so a rotation decision always
//! falls strictly between two writes.

use crate::appenders::rotation::{archive_file_name, rotation_bucket};
use crate::appenders::write_queue::{QueueConsumer, Sink, SinkStatus, WriteQueue};
use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::event::LogEvent;
use crate::core::level::Level;
use crate::forward::ForwardPayload;
use crate::layout::Layout;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const DEFAULT_HIGH_WATER: usize = 64 * 1024;

/// Options for one rotating-file appender.
#[derive(Debug, Clone)]
pub struct RotateFileOptions {
    pub directory: PathBuf,
    /// Fixed name of the live file.
    pub file_name: String,
    /// Archive name pattern, `%yyyy %MM %dd %hh %mm` substituted from the
    /// previous write's timestamp.
    pub file_pattern: String,
    pub interval_ms: i64,
    /// POSIX permission bits for created files.
    pub mode: u32,
    /// Optional symlink kept pointing at the most recent archive.
    pub symlink: Option<PathBuf>,
}

impl Default for RotateFileOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: "app.log".to_string(),
            file_pattern: "%yyyy-%MM-%dd.log".to_string(),
            interval_ms: 24 * 60 * 60 * 1000,
            mode: 0o644,
            symlink: None,
        }
    }
}

fn open_active(path: &Path, mode: u32) -> Result<File> {
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

/// Buffered file stream reporting `Busy` past its high-water mark; a
/// drain is a flush to the OS.
pub(crate) struct FileSink {
    writer: BufWriter<File>,
    pending: usize,
    high_water: usize,
}

impl FileSink {
    pub(crate) fn new(file: File, high_water: usize) -> Self {
        Self {
            writer: BufWriter::new(file),
            pending: 0,
            high_water,
        }
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, bytes: &[u8]) -> Result<SinkStatus> {
        self.writer.write_all(bytes)?;
        self.pending += bytes.len();
        if self.pending >= self.high_water {
            Ok(SinkStatus::Busy)
        } else {
            Ok(SinkStatus::Ready)
        }
    }

    fn await_drain(&mut self) -> Result<()> {
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.pending = 0;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RotationState {
    current_bucket: Option<i64>,
    last_write: Option<DateTime<Local>>,
}

type OpenFn<S> = Box<dyn FnMut(&Path) -> Result<S> + Send>;

/// The single sequential processing path: owns the stream and the
/// rotation state exclusively.
pub(crate) struct RotationWorker<S: Sink> {
    directory: PathBuf,
    active_path: PathBuf,
    file_pattern: String,
    interval_ms: i64,
    symlink: Option<PathBuf>,
    open: OpenFn<S>,
    sink: Option<S>,
    state: RotationState,
}

impl<S: Sink> RotationWorker<S> {
    pub(crate) fn new(options: &RotateFileOptions, open: OpenFn<S>) -> Self {
        let active_path = options.directory.join(&options.file_name);
        let mut state = RotationState::default();

        // A restart must not spuriously rotate a file that is still
        // current: seed the bucket from the live file's mtime.
        if let Ok(modified) = fs::metadata(&active_path).and_then(|m| m.modified()) {
            let modified: DateTime<Local> = modified.into();
            state.current_bucket = Some(rotation_bucket(&modified, options.interval_ms));
            state.last_write = Some(modified);
        }

        Self {
            directory: options.directory.clone(),
            active_path,
            file_pattern: options.file_pattern.clone(),
            interval_ms: options.interval_ms,
            symlink: options.symlink.clone(),
            open,
            sink: None,
            state,
        }
    }

    fn rotate(&mut self, new_bucket: i64, fallback: DateTime<Local>) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.flush()?;
        }

        if self.active_path.exists() {
            // The archive carries the name of the period that just
            // closed, so it is stamped from the previous write.
            let stamp = self.state.last_write.unwrap_or(fallback);
            let archived = self
                .directory
                .join(archive_file_name(&self.file_pattern, &stamp));
            if archived == self.active_path {
                return Err(LoggerError::file_rotation(
                    self.active_path.display().to_string(),
                    "archive name collides with the live file name",
                ));
            }

            loop {
                if archived.exists() {
                    fs::remove_file(&archived).map_err(|e| {
                        LoggerError::file_rotation(
                            self.active_path.display().to_string(),
                            format!("Failed to clear colliding archive: {e}"),
                        )
                    })?;
                }
                match fs::rename(&self.active_path, &archived) {
                    Ok(()) => break,
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                    Err(e) => {
                        return Err(LoggerError::file_rotation(
                            self.active_path.display().to_string(),
                            format!("Failed to rename to '{}': {e}", archived.display()),
                        ))
                    }
                }
            }

            self.sink = Some((self.open)(&self.active_path)?);

            if let Some(link) = self.symlink.clone() {
                if let Err(e) = replace_symlink(&link, &archived) {
                    eprintln!("[logger] failed to update symlink '{}': {e}", link.display());
                }
            }
        } else {
            self.sink = Some((self.open)(&self.active_path)?);
        }

        self.state.current_bucket = Some(new_bucket);
        Ok(())
    }
}

#[cfg(unix)]
fn replace_symlink(link: &Path, target: &Path) -> Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_file(link)?;
    }
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(not(unix))]
fn replace_symlink(_link: &Path, _target: &Path) -> Result<()> {
    Ok(())
}

impl<S: Sink> QueueConsumer for RotationWorker<S> {
    fn handle(&mut self, line: &str, when: DateTime<Local>) -> Result<()> {
        let bucket = rotation_bucket(&when, self.interval_ms);
        match self.state.current_bucket {
            None => self.state.current_bucket = Some(bucket),
            Some(current) if bucket > current => self.rotate(bucket, when)?,
            Some(_) => {}
        }

        if self.sink.is_none() {
            self.sink = Some((self.open)(&self.active_path)?);
        }
        let Some(sink) = self.sink.as_mut() else {
            return Err(LoggerError::writer("rotating sink not open"));
        };

        match sink.write_line(line.as_bytes())? {
            SinkStatus::Busy => sink.await_drain()?,
            SinkStatus::Ready => {}
        }
        self.state.last_write = Some(when);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.flush() {
                eprintln!("[logger] failed to flush on close: {e}");
            }
        }
    }
}

/// Rotating file appender: renders on the caller, writes on its own
/// single consumer thread.
pub struct RotatingFileAppender {
    name: String,
    min_level: Level,
    layout: Layout,
    queue: WriteQueue,
}

impl RotatingFileAppender {
    /// Create the appender and spawn its write queue.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-positive interval and an IO
    /// error when the directory cannot be created.
    pub fn new(
        name: impl Into<String>,
        min_level: Level,
        layout: Layout,
        options: RotateFileOptions,
    ) -> Result<Self> {
        let name = name.into();
        if options.interval_ms <= 0 {
            return Err(LoggerError::config(
                format!("appenders.{name}"),
                "rotation interval must be positive",
            ));
        }
        fs::create_dir_all(&options.directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create '{}'", options.directory.display()),
                e,
            )
        })?;

        let mode = options.mode;
        let worker = RotationWorker::new(
            &options,
            Box::new(move |path: &Path| {
                Ok(FileSink::new(open_active(path, mode)?, DEFAULT_HIGH_WATER))
            }),
        );
        let queue = WriteQueue::spawn(&name, worker);

        Ok(Self {
            name,
            min_level,
            layout,
            queue,
        })
    }
}

fn terminated(mut line: String) -> String {
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Level {
        self.min_level
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let line = terminated(self.layout.render(event));
        self.queue.enqueue(line, event.when, None);
        Ok(())
    }

    fn append_forwarded(&self, payload: &ForwardPayload) -> Result<()> {
        // forwarded lines join the same queue; file order is arrival
        // order at the master
        let line = terminated(self.layout.render_payload(payload));
        self.queue.enqueue(line, Local::now(), None);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.queue.flush();
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.queue.close();
        Ok(())
    }
}
