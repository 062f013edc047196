//! Appender implementations

pub mod console;
pub mod file;
pub mod rotating_file;
pub mod rotation;
pub mod worker;
pub mod write_queue;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use rotating_file::{RotateFileOptions, RotatingFileAppender};
pub use rotation::{archive_file_name, rotation_bucket};
pub use worker::{ForwardAppender, ForwardMode};
pub use write_queue::{Completion, QueueConsumer, Sink, SinkStatus, WriteQueue};

// Re-export the trait next to its implementations
pub use crate::core::Appender;
